use std::sync::Mutex;

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use ladder_core::{Question, QuestionDraft, QuestionId};

use super::QuestionSupplier;
use crate::error::SupplyError;

/// German B1 grammar questions: (prompt, options, correct answer).
const GERMAN_B1: &[(&str, [&str; 4], &str)] = &[
    ("Complete the sentence: Ich gehe ___ die Schule.", ["in", "an", "auf", "zu"], "in"),
    ("Complete the sentence: Wir gehen heute ___ Supermarkt.", ["zum", "zur", "im", "beim"], "zum"),
    ("Complete the sentence: Im Sommer fahren wir ___ Berlin.", ["nach", "zu", "in", "bei"], "nach"),
    ("Complete the sentence: Ich warte schon lange ___ den Bus.", ["auf", "für", "an", "über"], "auf"),
    ("Complete the sentence: Sie interessiert sich sehr ___ Musik.", ["für", "an", "über", "auf"], "für"),
    ("Complete the sentence: Am Wochenende gehen wir ___ Kino.", ["ins", "im", "zum", "am"], "ins"),
    ("Complete the sentence: Gestern ___ ich einen langen Brief geschrieben.", ["habe", "bin", "hatte", "war"], "habe"),
    ("Complete the sentence: Wir ___ gestern nach Hamburg gefahren.", ["sind", "haben", "waren", "hatten"], "sind"),
    ("Complete the sentence: Ich weiß nicht, ___ er morgen kommt.", ["ob", "dass", "wenn", "weil"], "ob"),
    ("Complete the sentence: ___ ich ein Kind war, wohnten wir auf dem Land.", ["Als", "Wenn", "Wann", "Ob"], "Als"),
    ("Complete the sentence: Kennst du ___ Mann dort drüben?", ["den", "der", "dem", "des"], "den"),
    ("Complete the sentence: Das ist die Frau, ___ ich gestern geholfen habe.", ["der", "die", "den", "deren"], "der"),
    ("Complete the sentence: Wegen ___ Regens bleiben wir zu Hause.", ["des", "dem", "den", "der"], "des"),
    ("Complete the sentence: Wenn ich Zeit ___, würde ich dich besuchen.", ["hätte", "habe", "hatte", "hätten"], "hätte"),
    ("Complete the sentence: Ich erinnere mich gern ___ meine Kindheit.", ["an", "auf", "für", "über"], "an"),
    ("Complete the sentence: Kannst du mir bitte ___ Salz geben?", ["das", "der", "die", "den"], "das"),
    ("Complete the sentence: Der Zug hat heute zwanzig Minuten ___.", ["Verspätung", "Pause", "Zeit", "Abfahrt"], "Verspätung"),
    ("Complete the sentence: Es ist wichtig, jeden Tag ___ üben.", ["zu", "um", "für", "an"], "zu"),
    ("Complete the sentence: Ich bleibe zu Hause, ___ ich krank bin.", ["weil", "denn", "deshalb", "trotzdem"], "weil"),
    ("Complete the sentence: Das alte Haus wird gerade ___.", ["renoviert", "renovieren", "renovierte", "renoviere"], "renoviert"),
    ("Complete the sentence: Mein Bruder ist zwei Jahre ___ als ich.", ["älter", "alt", "am ältesten", "älteste"], "älter"),
    ("Complete the sentence: Vergiss nicht, das Fenster zu ___.", ["schließen", "schließt", "geschlossen", "schloss"], "schließen"),
    ("Complete the sentence: Der Kurs beginnt ___ 8 Uhr.", ["um", "am", "im", "zu"], "um"),
    ("Complete the sentence: Ich habe meinen Schlüssel ___.", ["verloren", "verlieren", "verlor", "verliert"], "verloren"),
    ("Complete the sentence: Mit ___ Bus fährst du zur Arbeit?", ["welchem", "welcher", "welchen", "welches"], "welchem"),
    ("Complete the sentence: Wir müssen noch die Hausaufgaben ___.", ["machen", "tun", "geben", "nehmen"], "machen"),
];

/// Offline question supplier drawing from a fixed set of drafts.
pub struct QuestionBank {
    drafts: Vec<QuestionDraft>,
    rng: Mutex<StdRng>,
}

impl QuestionBank {
    /// The built-in German B1 bank.
    #[must_use]
    pub fn german_b1() -> Self {
        Self::new(builtin_drafts())
    }

    #[must_use]
    pub fn new(drafts: Vec<QuestionDraft>) -> Self {
        Self {
            drafts,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Reproducible draws and option orders.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    fn draw(&self, count: usize, already_seen: &[String]) -> Result<Vec<Question>, SupplyError> {
        let unseen: Vec<&QuestionDraft> = self
            .drafts
            .iter()
            .filter(|draft| !already_seen.contains(&draft.question))
            .collect();
        if unseen.len() < count {
            return Err(SupplyError::Exhausted {
                requested: count,
                available: unseen.len(),
            });
        }

        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let picked: Vec<QuestionDraft> = unseen
            .choose_multiple(&mut *rng, count)
            .map(|draft| (*draft).clone())
            .collect();
        picked
            .into_iter()
            .map(|draft| {
                Ok(draft
                    .validate(QuestionId::random())?
                    .with_shuffled_options(&mut *rng))
            })
            .collect()
    }
}

#[async_trait]
impl QuestionSupplier for QuestionBank {
    async fn supply(
        &self,
        count: usize,
        already_seen: &[String],
    ) -> Result<Vec<Question>, SupplyError> {
        self.draw(count, already_seen)
    }
}

fn builtin_drafts() -> Vec<QuestionDraft> {
    GERMAN_B1
        .iter()
        .map(|(prompt, options, correct)| QuestionDraft {
            question: (*prompt).to_owned(),
            options: options.iter().map(|option| (*option).to_owned()).collect(),
            correct_answer: (*correct).to_owned(),
        })
        .collect()
}
