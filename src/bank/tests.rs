use std::path::Path;

use super::*;
use crate::template::Value;

const SAMPLE_YAML: &str = r#"
mcq:
  - question: "What is 2+2?"
    options: [3, 4, 5]
    answer: 4
    marks: 2
  - template: "What is {{a}}+{{b}}?"
    options: ["{{a+b}}", "{{a-b}}"]
    answer: "{{a+b}}"
    variables:
      - { a: 3, b: 4 }
      - { a: 10, b: 2 }
subjective:
  - question: "Explain overfitting."
    answer: "The model memorizes noise."
  - template: "Area of a {{length}} by {{width}} rectangle?"
    marks: 3
    variables:
      - { length: 5, width: 3, answer: "15" }
  - question: "Answer both parts."
    solution: "See parts"
    marks: 5
    parts:
      - { question: "Define bias.", answer: "Systematic error.", marks: 2 }
      - { question: "Define variance.", solution: "Spread.", marks: 3 }
"#;

const SAMPLE_MARKDOWN: &str = "\
# Physics quiz

Some introduction.

## MCQ

**What is 2+2?**
- 3
- 4
- 5
*Answer:* 4

**Capital of France?**
- London
- Paris
*Answer:* Paris

## Subjective

**Explain overfitting.**
The model learns noise
instead of signal.

**Define entropy.**
Expected information.

## Notes

**Not a question**
Ignored.
";

fn load_error(yaml: &str) -> RecordError {
    QuestionBank::from_yaml_str(yaml)
        .unwrap_err()
        .downcast_ref::<RecordError>()
        .cloned()
        .unwrap()
}

#[test]
fn loads_every_record_kind_from_yaml() {
    let bank = QuestionBank::from_yaml_str(SAMPLE_YAML).unwrap();
    assert_eq!(bank.mcq.len(), 2);
    assert_eq!(bank.subjective.len(), 3);

    assert_eq!(
        bank.mcq[0],
        McqRecord::Static {
            question: "What is 2+2?".to_owned(),
            options: vec!["3".to_owned(), "4".to_owned(), "5".to_owned()],
            answer: "4".to_owned(),
            marks: 2,
        }
    );
    match &bank.mcq[1] {
        McqRecord::Templated {
            variables, marks, ..
        } => {
            assert_eq!(variables.len(), 2);
            assert_eq!(variables[0]["a"], Value::Int(3));
            assert_eq!(*marks, record::DEFAULT_MCQ_MARKS as u32);
        }
        other => panic!("expected a templated MCQ, got {:?}", other),
    }

    assert_eq!(bank.subjective[0].marks(), record::DEFAULT_SUBJECTIVE_MARKS as u32);
    assert!(matches!(bank.subjective[1], SubjectiveRecord::Templated { marks: 3, .. }));
    match &bank.subjective[2] {
        SubjectiveRecord::MultiPart { answer, parts, .. } => {
            assert_eq!(answer, "See parts");
            assert_eq!(parts.len(), 2);
            assert_eq!(parts[1].answer, "Spread.");
            assert_eq!(parts[1].marks, 3);
        }
        other => panic!("expected a multi-part question, got {:?}", other),
    }
}

#[test]
fn accepts_alternate_section_names() {
    let bank = QuestionBank::from_yaml_str(
        r#"
multiple_choice:
  - { question: "Pick one", options: ["a", "b"], answer: "a" }
short_answer:
  - { question: "Why?", answer: "Because." }
"#,
    )
    .unwrap();
    assert_eq!(bank.mcq.len(), 1);
    assert_eq!(bank.subjective.len(), 1);
}

#[test]
fn loads_json() {
    let bank = QuestionBank::from_json_str(
        r#"{
            "mcq": [{"question": "Pi?", "options": [3.14, 2.72], "answer": 3.14, "marks": 1}],
            "subjective": []
        }"#,
    )
    .unwrap();
    assert_eq!(
        bank.mcq[0],
        McqRecord::Static {
            question: "Pi?".to_owned(),
            options: vec!["3.14".to_owned(), "2.72".to_owned()],
            answer: "3.14".to_owned(),
            marks: 1,
        }
    );
    assert!(bank.subjective.is_empty());
}

#[test]
fn loads_csv() {
    let csv = "\
Type,Question,Option A,Option B,Option C,Answer,Solution,Marks
mcq,Capital of France?,London,Paris,Rome,Paris,,2
subjective,Explain gravity.,,,,,Mass attracts mass.,4
,,,,,,,
,Which is prime?,4,7,,7,,
";
    let bank = QuestionBank::from_csv_reader(csv.as_bytes()).unwrap();
    assert_eq!(bank.mcq.len(), 2);
    assert_eq!(
        bank.mcq[0],
        McqRecord::Static {
            question: "Capital of France?".to_owned(),
            options: vec!["London".to_owned(), "Paris".to_owned(), "Rome".to_owned()],
            answer: "Paris".to_owned(),
            marks: 2,
        }
    );
    assert_eq!(bank.mcq[1].marks(), 1);
    assert_eq!(
        bank.subjective,
        vec![SubjectiveRecord::Static {
            question: "Explain gravity.".to_owned(),
            answer: "Mass attracts mass.".to_owned(),
            marks: 4,
        }]
    );
}

#[test]
fn csv_without_question_column_is_rejected() {
    assert!(QuestionBank::from_csv_reader("prompt,answer\nhi,there\n".as_bytes()).is_err());
}

#[test]
fn csv_with_bad_marks_is_rejected() {
    let csv = "question,answer,marks\nWhy?,Because,lots\n";
    assert!(QuestionBank::from_csv_reader(csv.as_bytes()).is_err());
}

#[test]
fn conversion_errors_name_the_record() {
    let error = QuestionBank::from_yaml_str(
        r#"
mcq:
  - { question: "Fine", options: ["a", "b"], answer: "a" }
  - { question: "Broken", options: ["a"], answer: "a" }
"#,
    )
    .unwrap_err();
    assert_eq!(
        format!("{:#}", error),
        "MCQ question 2: needs at least 2 options, found 1"
    );
}

#[test]
fn options_are_limited_to_the_alphabet() {
    let options = |count: usize| {
        (0..count)
            .map(|i| format!("o{}", i))
            .collect::<Vec<_>>()
            .join(", ")
    };
    assert_eq!(
        load_error(&format!(
            "mcq: [{{ question: q, options: [{}], answer: o0 }}]",
            options(27)
        )),
        RecordError::TooManyOptions(27)
    );
    let bank = QuestionBank::from_yaml_str(&format!(
        "mcq: [{{ question: q, options: [{}], answer: o0 }}]",
        options(26)
    ))
    .unwrap();
    assert!(bank.validate().is_valid());

    let parts = (0..27)
        .map(|i| format!("{{ question: p{}, answer: a{} }}", i, i))
        .collect::<Vec<_>>()
        .join(", ");
    assert_eq!(
        load_error(&format!(
            "subjective: [{{ question: q, answer: a, parts: [{}] }}]",
            parts
        )),
        RecordError::TooManyParts(27)
    );
}

#[test]
fn validation_rejects_records_with_too_many_options() {
    let bank = QuestionBank {
        mcq: vec![McqRecord::Static {
            question: "Pick".to_owned(),
            options: (0..27).map(|i| i.to_string()).collect(),
            answer: "0".to_owned(),
            marks: 1,
        }],
        subjective: vec![],
    };
    assert_eq!(
        bank.validate().errors,
        vec!["MCQ question 1: has 27 options, at most 26 are supported".to_owned()]
    );
}

#[test]
fn parts_default_to_one_mark() {
    let bank = QuestionBank::from_yaml_str(
        "subjective: [{ question: q, answer: a, parts: [{ question: p, answer: x }] }]",
    )
    .unwrap();
    match &bank.subjective[0] {
        SubjectiveRecord::MultiPart { parts, .. } => {
            assert_eq!(parts[0].marks, record::DEFAULT_PART_MARKS as u32)
        }
        other => panic!("expected a multi-part question, got {:?}", other),
    }
}

#[test]
fn rejects_malformed_records() {
    assert_eq!(
        load_error("mcq: [{ options: [a, b], answer: a }]"),
        RecordError::MissingText
    );
    assert_eq!(
        load_error("mcq: [{ question: q, template: t, options: [a, b], answer: a }]"),
        RecordError::AmbiguousText
    );
    assert_eq!(
        load_error("mcq: [{ template: t, options: [a, b], answer: a }]"),
        RecordError::MissingVariables
    );
    assert_eq!(
        load_error("mcq: [{ template: t, options: [a, b], answer: a, variables: [] }]"),
        RecordError::MissingVariables
    );
    assert_eq!(
        load_error("mcq: [{ question: q, options: [a, b], answer: a, variables: [{ x: 1 }] }]"),
        RecordError::UnexpectedVariables
    );
    assert_eq!(
        load_error("mcq: [{ question: q, options: [a, b] }]"),
        RecordError::MissingAnswer
    );
    assert_eq!(
        load_error("mcq: [{ question: q, options: [a, b], answer: a, marks: 0 }]"),
        RecordError::InvalidMarks(0)
    );
    assert_eq!(
        load_error("subjective: [{ question: q }]"),
        RecordError::MissingAnswer
    );
    assert_eq!(
        load_error("subjective: [{ template: t, variables: [{ answer: 1 }, { x: 2 }] }]"),
        RecordError::VariantMissingAnswer(2)
    );
    assert_eq!(
        load_error("subjective: [{ question: q, answer: a, parts: [{ question: p }] }]"),
        RecordError::Part {
            index: 1,
            source: Box::new(RecordError::MissingAnswer),
        }
    );
}

#[test]
fn loads_markdown() {
    let bank = QuestionBank::from_markdown_str(SAMPLE_MARKDOWN).unwrap();
    assert_eq!(
        bank.mcq,
        vec![
            McqRecord::Static {
                question: "What is 2+2?".to_owned(),
                options: vec!["3".to_owned(), "4".to_owned(), "5".to_owned()],
                answer: "4".to_owned(),
                marks: 1,
            },
            McqRecord::Static {
                question: "Capital of France?".to_owned(),
                options: vec!["London".to_owned(), "Paris".to_owned()],
                answer: "Paris".to_owned(),
                marks: 1,
            },
        ]
    );
    assert_eq!(
        bank.subjective,
        vec![
            SubjectiveRecord::Static {
                question: "Explain overfitting.".to_owned(),
                answer: "The model learns noise\ninstead of signal.".to_owned(),
                marks: 5,
            },
            SubjectiveRecord::Static {
                question: "Define entropy.".to_owned(),
                answer: "Expected information.".to_owned(),
                marks: 5,
            },
        ]
    );
}

#[test]
fn markdown_needs_a_question_section() {
    assert!(QuestionBank::from_markdown_str("# Quiz\n\nNothing here.\n").is_err());
    let error = QuestionBank::from_markdown_str("## MCQ\n**Lonely?**\n- yes\n*Answer:* yes\n")
        .unwrap_err();
    assert_eq!(
        format!("{:#}", error),
        "MCQ question 1: needs at least 2 options, found 1"
    );
}

#[test]
fn detects_format_from_extension() {
    assert_eq!(Format::detect(Path::new("bank.yaml")).unwrap(), Format::Yaml);
    assert_eq!(Format::detect(Path::new("bank.YML")).unwrap(), Format::Yaml);
    assert_eq!(Format::detect(Path::new("dir/bank.json")).unwrap(), Format::Json);
    assert_eq!(Format::detect(Path::new("bank.csv")).unwrap(), Format::Csv);
    assert_eq!(Format::detect(Path::new("bank.md")).unwrap(), Format::Markdown);
    assert!(Format::detect(Path::new("bank.txt")).is_err());
    assert!(Format::detect(Path::new("bank")).is_err());
}

#[test]
fn opens_bank_from_disk() {
    let directory = std::env::temp_dir().join(format!("quizset-bank-{}", std::process::id()));
    std::fs::create_dir_all(&directory).unwrap();
    let path = directory.join("sample.yaml");
    std::fs::write(&path, SAMPLE_YAML).unwrap();

    let bank = QuestionBank::open(&path).unwrap();
    assert_eq!(bank, QuestionBank::from_yaml_str(SAMPLE_YAML).unwrap());

    let markdown_path = directory.join("sample.md");
    std::fs::write(&markdown_path, SAMPLE_MARKDOWN).unwrap();
    assert_eq!(QuestionBank::open(&markdown_path).unwrap().mcq.len(), 2);

    assert!(QuestionBank::open(&directory.join("missing.yaml")).is_err());
    std::fs::remove_dir_all(&directory).unwrap();
}

#[test]
fn sample_bank_is_valid() {
    let bank = QuestionBank::from_yaml_str(SAMPLE_YAML).unwrap();
    let report = bank.validate();
    assert!(report.is_valid(), "{}", report);
    assert!(report.warnings.is_empty(), "{}", report);
}

#[test]
fn validation_reports_unmatched_answers() {
    let bank = QuestionBank::from_yaml_str(
        r#"
mcq:
  - { question: "2+2?", options: [3, 5], answer: 4 }
  - { question: "Pick", options: [x, x, y], answer: x }
"#,
    )
    .unwrap();
    let report = bank.validate();
    assert_eq!(
        report.errors,
        vec!["MCQ question 1: answer `4` does not match any option".to_owned()]
    );
    assert_eq!(
        report.warnings,
        vec!["MCQ question 2: answer `x` matches 2 options".to_owned()]
    );
    assert!(!report.is_valid());
}

#[test]
fn validation_checks_every_variant() {
    let bank = QuestionBank::from_yaml_str(
        r#"
mcq:
  - template: "{{a}} squared?"
    options: ["{{a*a}}", "{{a+a}}"]
    answer: "{{a*a}}"
    variables: [{ a: 3 }, { a: 2 }, { b: 1 }]
"#,
    )
    .unwrap();
    let report = bank.validate();
    assert_eq!(
        report.warnings,
        vec!["MCQ question 1 (variable set 2): answer `4` matches 2 options".to_owned()]
    );
    assert_eq!(
        report.errors,
        vec![
            "MCQ question 1 (variable set 3): undefined variable `a` in expression `a`"
                .to_owned()
        ]
    );
}

#[test]
fn validation_checks_subjective_templates_and_parts() {
    let bank = QuestionBank::from_yaml_str(
        r#"
subjective:
  - template: "Explain {{ topic }}"
    variables: [{ answer: "x" }]
  - question: "Two parts"
    answer: "See parts"
    marks: 10
    parts:
      - { question: "One", answer: "1", marks: 2 }
      - { question: "Two", answer: "2", marks: 3 }
"#,
    )
    .unwrap();
    let report = bank.validate();
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("Subjective question 1 (variable set 1): "));
    assert_eq!(
        report.warnings,
        vec!["Subjective question 2: parts add up to 5 marks but the question is worth 10"
            .to_owned()]
    );
}

#[test]
fn validation_lints_latex() {
    let bank = QuestionBank::from_yaml_str(
        r#"
subjective:
  - { question: 'Simplify $\frac{1}{2', answer: "x" }
"#,
    )
    .unwrap();
    let report = bank.validate();
    assert!(report.is_valid());
    assert!(!report.warnings.is_empty());
    assert!(report
        .warnings
        .iter()
        .all(|w| w.starts_with("Subjective question 1: ")));
}

#[test]
fn stats_hold_totals_beyond_u32() {
    let heavy = |question: &str| McqRecord::Static {
        question: question.to_owned(),
        options: vec!["a".to_owned(), "b".to_owned()],
        answer: "a".to_owned(),
        marks: 3_000_000_000,
    };
    let bank = QuestionBank {
        mcq: vec![heavy("First?"), heavy("Second?")],
        subjective: vec![],
    };
    let stats = bank.stats();
    assert_eq!(stats.total_mcq_marks, 6_000_000_000);
    assert_eq!(stats.total_marks(), 6_000_000_000);
}

#[test]
fn counts_bank_contents() {
    let bank = QuestionBank::from_yaml_str(SAMPLE_YAML).unwrap();
    let stats = bank.stats();
    assert_eq!(
        stats,
        BankStats {
            mcq_count: 2,
            subjective_count: 3,
            templated_mcq: 1,
            templated_subjective: 1,
            multi_part_subjective: 1,
            total_mcq_marks: 3,
            total_subjective_marks: 13,
        }
    );
    assert_eq!(stats.total_questions(), 5);
    assert_eq!(stats.total_marks(), 16);
    assert!(stats.to_string().ends_with("5 questions, 16 marks"));
}

#[test]
fn empty_bank() {
    let bank = QuestionBank::from_yaml_str("{}").unwrap();
    assert!(bank.is_empty());
    assert_eq!(bank.stats(), BankStats::default());
    assert!(bank.validate().is_valid());
}

#[test]
fn shipped_sample_bank_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("banks/sample.yaml");
    let bank = QuestionBank::open(&path).unwrap();
    let report = bank.validate();
    assert!(report.is_valid(), "{}", report);
    assert!(report.warnings.is_empty(), "{}", report);
    assert_eq!(bank.stats().templated_mcq, 3);
}
