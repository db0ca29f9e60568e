//! French stopword table used by the vocabulary ranking.

use std::collections::HashSet;

use once_cell::sync::Lazy;

#[rustfmt::skip]
static STOPWORDS_FR: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "a","à","â","afin","ai","aie","aient","ainsi","ait","alors","après","assez","au","aucun","aucune","aujourd","aujourd’hui","aupres","auquel","aura","aurai","auraient","aurais","aurait","auras","aurez","auriez","aurions","aurons","auront","aussi","autre","autres","aux","auxquelles","auxquels","avaient","avais","avait","avant","avec","avez","aviez","avions","avoir","avons","ayant","ayez","ayons",
        "car","ce","ceci","cela","celle","celles","celui","cependant","certain","certaine","certaines","certains","ces","cet","cette","ceux","chacun","chaque","chez","ci","comme","comment","contre","d","dans","de","des","du","dedans","dehors","depuis","devant","doit","doivent","donc","dont","dos","droite","début","désormais",
        "elle","elles","en","encore","ensuite","entre","envers","environ","est","et","etaient","etais","etait","etant","ete","etes","etre","eux",
        "fait","faite","faites","fois","font","furent","fut",
        "grande","grandes","grand","grands","haut","hors","ici","il","ils","je","jusqu","juste",
        "l","la","le","les","leur","leurs","là","lequel","lesquels","lesquelles","lors","lui",
        "ma","mais","mal","me","meme","mes","mien","mienne","miennes","miens","moi","moins","mon",
        "ne","ni","nommés","nos","notre","nous","nouveaux","on","ont","ou","où",
        "par","parce","parole","pas","pendant","personne","peu","peut","peuvent","peux","plus","plusieurs","plutôt","pour","pourquoi",
        "pourra","pourrais","pourrait","pourrez","pourrions","pourront","près","puis","puisque",
        "qu","quand","que","quel","quelle","quelles","quels","qui","quoi",
        "sa","sans","se","sera","serai","seraient","serais","serait","seras","serez","seriez","serions","serons","seront","ses","seulement",
        "si","sien","sienne","siennes","siens","soi","soit","sommes","son","sont","sous","souvent","sur",
        "ta","tandis","tel","telle","telles","tels","tes","toi","ton","tous","tout","toute","toutes","trois","trop","très","tu",
        "un","une","unes","uns","voici","voilà","vos","votre","vous","y",
    ])
});

/// Whether an already-lowercased token is a French stopword.
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS_FR.contains(word)
}
