use super::QuizSet;

fn part_label(index: usize) -> char {
    (b'a' + (index % 26) as u8) as char
}

/// Plain-text key numbered by presentation order: MCQs first, then
/// subjective questions continuing the same numbering.
pub fn build(quiz_set: &QuizSet) -> String {
    let mut lines = vec![
        format!("ANSWER KEY - Quiz Set {}", quiz_set.set_id),
        "=".repeat(40),
        String::new(),
    ];

    if !quiz_set.mcq.is_empty() {
        lines.push("MULTIPLE CHOICE QUESTIONS:".to_owned());
        lines.push("-".repeat(30));
        for (position, question) in quiz_set.mcq.iter().enumerate() {
            lines.push(format!(
                "Q{}: {} - {} ({} marks)",
                position + 1,
                question.correct_letter,
                question.answer,
                question.marks
            ));
        }
        lines.push(String::new());
    }

    if !quiz_set.subjective.is_empty() {
        lines.push("SUBJECTIVE QUESTIONS:".to_owned());
        lines.push("-".repeat(25));
        let offset = quiz_set.mcq.len();
        for (position, question) in quiz_set.subjective.iter().enumerate() {
            lines.push(format!(
                "Q{}: ({} marks)",
                offset + position + 1,
                question.marks
            ));
            lines.push(format!("Answer: {}", question.answer));
            for (index, part) in question.parts.iter().enumerate() {
                lines.push(format!(
                    "  ({}) {} ({} marks)",
                    part_label(index),
                    part.answer,
                    part.marks
                ));
            }
            lines.push(String::new());
        }
    }

    lines.join("\n")
}
