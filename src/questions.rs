//! Question bank, draw policy, and answer shuffling shared by battles and quizzes.

use crate::errors::{DataError, DataResult};
use crate::rng::BattleRng;
use schema::Domain;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    #[default]
    MultipleChoice,
    TrueFalse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(alias = "correct")]
    pub correct_index: usize,
    #[serde(default, deserialize_with = "lenient_domain")]
    pub domain: Option<Domain>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: QuestionKind,
    #[serde(skip)]
    pub used: bool,
}

fn lenient_domain<'de, D>(deserializer: D) -> Result<Option<Domain>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|name| match name.parse::<Domain>() {
        Ok(domain) => Some(domain),
        Err(_) => {
            warn!(domain = %name, "unknown question domain, treating as untagged");
            None
        }
    }))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BankFile {
    Wrapped { questions: Vec<Question> },
    Bare(Vec<Question>),
}

/// Parse a bank from JSON, either a bare array or `{ "questions": [...] }`.
/// Questions whose correct index does not point at an option are dropped.
pub fn parse_question_bank(json: &str) -> DataResult<Vec<Question>> {
    let file: BankFile =
        serde_json::from_str(json).map_err(|e| DataError::QuestionBank(e.to_string()))?;
    let questions = match file {
        BankFile::Wrapped { questions } | BankFile::Bare(questions) => questions,
    };

    Ok(questions
        .into_iter()
        .filter(|q| {
            let valid = q.correct_index < q.options.len();
            if !valid {
                warn!(question_id = %q.id, "skipping question with out-of-range correct index");
            }
            valid
        })
        .collect())
}

pub fn load_question_bank(path: &Path) -> DataResult<Vec<Question>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| DataError::QuestionBank(format!("{}: {}", path.display(), e)))?;
    let questions = parse_question_bank(&content)?;
    debug!(count = questions.len(), path = %path.display(), "loaded question bank");
    Ok(questions)
}

/// Questions available to one battle or quiz, with consume-once bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct QuestionPool {
    questions: Vec<Question>,
}

impl QuestionPool {
    pub fn new(mut questions: Vec<Question>) -> Self {
        for question in &mut questions {
            question.used = false;
        }
        Self { questions }
    }

    /// Shuffle the bank and keep at most `limit` questions.
    pub fn limited(questions: Vec<Question>, limit: usize, rng: &mut BattleRng) -> Self {
        let mut questions = questions;
        if questions.len() > limit {
            rng.shuffle(&mut questions, "question bank order");
            questions.truncate(limit);
        }
        Self::new(questions)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn unused_count(&self) -> usize {
        self.questions.iter().filter(|q| !q.used).count()
    }

    /// Draw the next question.
    ///
    /// Unused questions matching `domain` are preferred, then any unused
    /// question. Once every question has been used, the pool is reset and its
    /// first question returned as-is. `None` only for an empty pool.
    pub fn draw(&mut self, domain: Option<Domain>, rng: &mut BattleRng) -> Option<Question> {
        if self.questions.is_empty() {
            return None;
        }

        let unused: Vec<usize> = (0..self.questions.len())
            .filter(|&i| !self.questions[i].used)
            .collect();

        if unused.is_empty() {
            debug!("question pool exhausted, resetting");
            for question in &mut self.questions {
                question.used = false;
            }
            return Some(self.questions[0].clone());
        }

        let matching: Vec<usize> = unused
            .iter()
            .copied()
            .filter(|&i| domain.is_some() && self.questions[i].domain == domain)
            .collect();
        let candidates = if matching.is_empty() { &unused } else { &matching };

        let chosen = candidates[rng.pick_index(candidates.len(), "question draw")];
        self.questions[chosen].used = true;
        Some(self.questions[chosen].clone())
    }
}

const SPECIAL_ANSWER_MARKERS: [&str; 5] = [
    "all of the above",
    "none of the above",
    "both a and b",
    "a and b",
    "b and c",
];

fn is_special_answer(text: &str) -> bool {
    let lower = text.to_lowercase();
    SPECIAL_ANSWER_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// A question with its options reordered for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShuffledQuestion {
    pub question: Question,
    pub options: Vec<String>,
    pub correct_index: usize,
    /// `answer_map[shown] == original`
    pub answer_map: Vec<usize>,
}

impl ShuffledQuestion {
    /// Keep the original order.
    pub fn unshuffled(question: Question) -> Self {
        let answer_map = (0..question.options.len()).collect();
        Self {
            options: question.options.clone(),
            correct_index: question.correct_index,
            answer_map,
            question,
        }
    }

    /// Shuffle regular options; "all/none of the above" style options stay at
    /// the end in their original order. True/false questions are not reordered.
    pub fn shuffle(question: Question, rng: &mut BattleRng) -> Self {
        if question.kind == QuestionKind::TrueFalse {
            return Self::unshuffled(question);
        }

        let (mut regular, special): (Vec<usize>, Vec<usize>) =
            (0..question.options.len()).partition(|&i| !is_special_answer(&question.options[i]));
        rng.shuffle(&mut regular, "answer order");

        let answer_map: Vec<usize> = regular.into_iter().chain(special).collect();
        let options = answer_map
            .iter()
            .map(|&original| question.options[original].clone())
            .collect();
        let correct_index = answer_map
            .iter()
            .position(|&original| original == question.correct_index)
            .unwrap_or(question.correct_index);

        Self {
            question,
            options,
            correct_index,
            answer_map,
        }
    }

    pub fn is_correct(&self, shown_index: usize) -> bool {
        shown_index == self.correct_index
    }

    pub fn correct_text(&self) -> &str {
        &self.options[self.correct_index]
    }

    pub fn option_text(&self, shown_index: usize) -> Option<&str> {
        self.options.get(shown_index).map(String::as_str)
    }
}

/// Running accuracy as a rounded percentage; 100 before anything is asked.
pub fn score_percent(correct: u32, asked: u32) -> u8 {
    if asked == 0 {
        return 100;
    }
    ((correct as f64 / asked as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::test_question;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_parse_bare_and_wrapped_banks() {
        let bare = r#"[{"id":"q1","question":"What is Modbus?","options":["A","B"],"correctIndex":1,"domain":"protocols"}]"#;
        let wrapped = r#"{"questions":[{"id":"q1","question":"What is Modbus?","options":["A","B"],"correct":1}]}"#;

        let from_bare = parse_question_bank(bare).unwrap();
        let from_wrapped = parse_question_bank(wrapped).unwrap();

        assert_eq!(from_bare[0].domain, Some(Domain::Protocols));
        assert_eq!(from_bare[0].correct_index, 1);
        assert_eq!(from_wrapped[0].correct_index, 1);
        assert_eq!(from_wrapped[0].domain, None);
    }

    #[test]
    fn test_unknown_domain_and_bad_index_are_tolerated() {
        let json = r#"[
            {"id":"q1","question":"?","options":["A","B"],"correctIndex":0,"domain":"astrology"},
            {"id":"q2","question":"?","options":["A"],"correctIndex":3}
        ]"#;
        let bank = parse_question_bank(json).unwrap();
        assert_eq!(bank.len(), 1);
        assert_eq!(bank[0].domain, None);
    }

    #[test]
    fn test_malformed_bank_is_an_error() {
        assert!(matches!(parse_question_bank("{nope"), Err(DataError::QuestionBank(_))));
    }

    #[test]
    fn test_draw_prefers_matching_domain() {
        let mut pool = QuestionPool::new(vec![
            test_question("q1", Some(Domain::Windows)),
            test_question("q2", Some(Domain::Protocols)),
            test_question("q3", None),
        ]);
        let mut rng = BattleRng::new_for_test(vec![100]);
        let drawn = pool.draw(Some(Domain::Protocols), &mut rng).unwrap();
        assert_eq!(drawn.id, "q2");
        assert_eq!(pool.unused_count(), 2);
    }

    #[test]
    fn test_draw_falls_back_to_any_unused() {
        let mut pool = QuestionPool::new(vec![
            test_question("q1", Some(Domain::Windows)),
            test_question("q2", Some(Domain::Windows)),
        ]);
        let mut rng = BattleRng::new_for_test(vec![1]);
        let drawn = pool.draw(Some(Domain::Unix), &mut rng).unwrap();
        assert_eq!(drawn.id, "q1");
    }

    #[test]
    fn test_exhausted_pool_resets_and_returns_first() {
        let mut pool = QuestionPool::new(vec![
            test_question("q1", None),
            test_question("q2", None),
        ]);
        let mut rng = BattleRng::new_for_test(vec![100]);
        assert_eq!(pool.draw(None, &mut rng).unwrap().id, "q2");
        assert_eq!(pool.draw(None, &mut rng).unwrap().id, "q1");
        assert_eq!(pool.unused_count(), 0);

        let reset = pool.draw(None, &mut rng).unwrap();
        assert_eq!(reset.id, "q1");
        assert_eq!(pool.unused_count(), 2);
    }

    #[test]
    fn test_empty_pool_draws_nothing() {
        let mut pool = QuestionPool::new(vec![]);
        let mut rng = BattleRng::new_for_test(vec![1]);
        assert_eq!(pool.draw(None, &mut rng), None);
    }

    #[test]
    fn test_limited_pool_truncates_large_banks() {
        let bank: Vec<Question> = (0..30).map(|i| test_question(&format!("q{}", i), None)).collect();
        let mut rng = BattleRng::seeded(3);
        assert_eq!(QuestionPool::limited(bank, 25, &mut rng).len(), 25);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    fn test_shuffle_correct_index_maps_back_to_original_text(#[case] correct: usize) {
        let mut question = test_question("q", None);
        question.correct_index = correct;
        let original_text = question.options[correct].clone();

        for seed in 0..25 {
            let mut rng = BattleRng::seeded(seed);
            let shuffled = ShuffledQuestion::shuffle(question.clone(), &mut rng);
            assert_eq!(shuffled.correct_text(), original_text);
            assert_eq!(shuffled.answer_map[shuffled.correct_index], correct);

            let mut seen = shuffled.answer_map.clone();
            seen.sort();
            assert_eq!(seen, vec![0, 1, 2, 3]);
        }
    }

    #[test]
    fn test_special_answers_stay_last() {
        let mut question = test_question("q", None);
        question.options = vec![
            "Firewalls".to_string(),
            "All of the above".to_string(),
            "Data diodes".to_string(),
            "Segmentation".to_string(),
        ];
        question.correct_index = 1;

        for seed in 0..10 {
            let mut rng = BattleRng::seeded(seed);
            let shuffled = ShuffledQuestion::shuffle(question.clone(), &mut rng);
            assert_eq!(shuffled.options[3], "All of the above");
            assert_eq!(shuffled.correct_index, 3);
        }
    }

    #[test]
    fn test_true_false_is_not_reordered() {
        let mut question = test_question("q", None);
        question.kind = QuestionKind::TrueFalse;
        question.options = vec!["True".to_string(), "False".to_string()];
        question.correct_index = 1;
        let mut rng = BattleRng::seeded(1);
        let shuffled = ShuffledQuestion::shuffle(question, &mut rng);
        assert_eq!(shuffled.options, vec!["True", "False"]);
        assert_eq!(shuffled.correct_index, 1);
    }

    #[rstest]
    #[case(0, 0, 100)]
    #[case(23, 25, 92)]
    #[case(2, 3, 67)]
    #[case(0, 4, 0)]
    fn test_score_percent(#[case] correct: u32, #[case] asked: u32, #[case] expected: u8) {
        assert_eq!(score_percent(correct, asked), expected);
    }
}
