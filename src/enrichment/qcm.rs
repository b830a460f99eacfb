//! Multiple-choice question (QCM) flattening
//!
//! A case may carry zero or more `QCM` elements. Each becomes one block
//! `"<question> | Réponses: <a>; <b>"` and blocks are joined with `" || "`.

use crate::models::RawRecord;

const QCM_TAG: &str = "QCM";
const QUESTION_TAG: &str = "QUESTION";
const NESTED_ANSWER_TAG: &str = "ANSWER";
const NESTED_TEXT_TAG: &str = "TEXT";
const LETTERED_ANSWERS: [&str; 4] = ["ANSWERA", "ANSWERB", "ANSWERC", "ANSWERD"];

/// Placeholder for a question without any answer
pub const NO_ANSWER: &str = "Aucune réponse";

fn trimmed_scalar(node: Option<&RawRecord>) -> Option<&str> {
    node.and_then(RawRecord::as_scalar)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn answers(question: &RawRecord) -> Vec<&str> {
    let mut answers: Vec<&str> = LETTERED_ANSWERS
        .iter()
        .filter_map(|tag| trimmed_scalar(question.get(tag)))
        .collect();

    // Any other `answer*` scalar in document order (ANSWER1, ANSWER2, ...)
    for (tag, child) in question.entries().unwrap_or_default() {
        if !tag.to_lowercase().starts_with("answer") {
            continue;
        }
        if let Some(text) = trimmed_scalar(Some(child))
            && !answers.contains(&text)
        {
            answers.push(text);
        }
    }

    // <ANSWER><TEXT>...</TEXT></ANSWER>
    if let Some(nested) = question.get(NESTED_ANSWER_TAG)
        && matches!(nested, RawRecord::Map(_))
        && let Some(text) = trimmed_scalar(nested.get(NESTED_TEXT_TAG))
    {
        answers.push(text);
    }

    answers
}

fn flatten_question(question: &RawRecord) -> Option<String> {
    if !matches!(question, RawRecord::Map(_)) {
        return None;
    }
    let text = question
        .get(QUESTION_TAG)
        .and_then(RawRecord::as_scalar)
        .map(str::trim)
        .unwrap_or_default();
    let answers = answers(question);
    let answers = if answers.is_empty() {
        NO_ANSWER.to_string()
    } else {
        answers.join("; ")
    };
    Some(format!("{} | Réponses: {}", text, answers))
}

/// Flatten every QCM of a case record into one readable line.
///
/// Returns an empty string when the case has no QCM.
pub fn flatten_qcm(case: &RawRecord) -> String {
    let blocks: Vec<String> = match case.get(QCM_TAG) {
        Some(RawRecord::List(items)) => items.iter().filter_map(flatten_question).collect(),
        Some(single) => flatten_question(single).into_iter().collect(),
        None => Vec::new(),
    };
    blocks.join(" || ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(entries: Vec<(&str, RawRecord)>) -> RawRecord {
        RawRecord::map(entries)
    }

    #[test]
    fn test_single_qcm() {
        let case = RawRecord::map([(
            "QCM",
            question(vec![
                ("QUESTION", RawRecord::scalar(" Quel diagnostic ? ")),
                ("ANSWERA", RawRecord::scalar("Kyste")),
                ("ANSWERB", RawRecord::scalar(" Tumeur ")),
                ("ANSWERC", RawRecord::scalar("")),
            ]),
        )]);
        assert_eq!(flatten_qcm(&case), "Quel diagnostic ? | Réponses: Kyste; Tumeur");
    }

    #[test]
    fn test_repeated_qcms_are_joined() {
        let mut case = RawRecord::empty_map();
        case.insert(
            "QCM",
            question(vec![
                ("QUESTION", RawRecord::scalar("Q1")),
                ("ANSWER1", RawRecord::scalar("oui")),
                ("ANSWER2", RawRecord::scalar("non")),
                ("ANSWER3", RawRecord::scalar("oui")),
            ]),
        );
        case.insert(
            "QCM",
            question(vec![
                ("QUESTION", RawRecord::scalar("Q2")),
                ("ANSWER", RawRecord::map([("TEXT", RawRecord::scalar("IRM"))])),
            ]),
        );
        assert_eq!(flatten_qcm(&case), "Q1 | Réponses: oui; non || Q2 | Réponses: IRM");
    }

    #[test]
    fn test_missing_answers() {
        let case = RawRecord::map([(
            "QCM",
            question(vec![
                ("QUESTION", RawRecord::scalar("Q?")),
                ("ANSWERA", RawRecord::scalar("  ")),
            ]),
        )]);
        assert_eq!(flatten_qcm(&case), "Q? | Réponses: Aucune réponse");

        let answer_only = question(vec![("ANSWERA", RawRecord::scalar("a"))]);
        let no_question = RawRecord::map([("QCM", answer_only)]);
        assert_eq!(flatten_qcm(&no_question), " | Réponses: a");
    }

    #[test]
    fn test_no_qcm_is_empty() {
        assert_eq!(flatten_qcm(&RawRecord::empty_map()), "");
        assert_eq!(flatten_qcm(&RawRecord::map([("QCM", RawRecord::scalar("loose"))])), "");
        assert_eq!(flatten_qcm(&RawRecord::scalar("x")), "");
    }
}
