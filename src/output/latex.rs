use anyhow::Result;
use std::fmt::Write;

use super::layout::{Layout, OptionStyle};
use super::DocumentRenderer;
use crate::bank::Part;
use crate::quiz::{QuizSet, ResolvedMcq, ResolvedSubjective};

fn marks_label(marks: u32) -> String {
    if marks == 1 {
        "1 mark".to_owned()
    } else {
        format!("{} marks", marks)
    }
}

/// Renders a quiz set as a standalone LaTeX document.
///
/// Question, option and answer text is authored LaTeX and is emitted as-is.
#[derive(Clone, Debug, Default)]
pub struct LatexRenderer;

impl LatexRenderer {
    pub fn new() -> Self {
        LatexRenderer
    }

    fn preamble(&self, out: &mut String, layout: &Layout) -> Result<()> {
        let mut class_options = vec![layout.font_size, "a4paper"];
        if layout.two_column {
            class_options.push("twocolumn");
        }
        writeln!(out, "\\documentclass[{}]{{article}}", class_options.join(","))?;
        writeln!(out, "\\usepackage[margin={}]{{geometry}}", layout.margin)?;
        writeln!(out, "\\usepackage{{amsmath,amssymb}}")?;
        writeln!(out, "\\usepackage{{enumitem}}")?;
        writeln!(out, "\\usepackage{{multicol}}")?;
        if layout.colored {
            writeln!(out, "\\usepackage[dvipsnames]{{xcolor}}")?;
            writeln!(out, "\\newcommand{{\\sectiontitle}}[1]{{\\textcolor{{NavyBlue}}{{#1}}}}")?;
        } else {
            writeln!(out, "\\newcommand{{\\sectiontitle}}[1]{{#1}}")?;
        }
        writeln!(out, "\\pagestyle{{plain}}")?;
        Ok(())
    }

    fn title(&self, out: &mut String, quiz_set: &QuizSet) -> Result<()> {
        writeln!(out, "\\begin{{center}}")?;
        writeln!(out, "{{\\Large\\textbf{{Quiz Set {}}}}}\\\\[0.5em]", quiz_set.set_id)?;
        writeln!(out, "Total: {}", marks_label(quiz_set.total_marks))?;
        writeln!(out, "\\end{{center}}")?;
        writeln!(out, "\\noindent Name: \\rule{{6cm}}{{0.4pt}} \\hfill ID: \\rule{{4cm}}{{0.4pt}}")?;
        writeln!(out, "\\vspace{{1em}}")?;
        Ok(())
    }

    fn options(&self, out: &mut String, question: &ResolvedMcq, layout: &Layout) -> Result<()> {
        if let OptionStyle::Columns(columns) = layout.option_style {
            writeln!(out, "\\begin{{multicols}}{{{}}}", columns)?;
        }
        writeln!(out, "\\begin{{enumerate}}[label=(\\Alph*)]")?;
        for option in &question.options {
            writeln!(out, "\\item {}", option)?;
        }
        writeln!(out, "\\end{{enumerate}}")?;
        if let OptionStyle::Columns(_) = layout.option_style {
            writeln!(out, "\\end{{multicols}}")?;
        }
        Ok(())
    }

    fn mcq_section(&self, out: &mut String, quiz_set: &QuizSet, layout: &Layout) -> Result<()> {
        writeln!(
            out,
            "\\section*{{\\sectiontitle{{Multiple Choice Questions}} ({})}}",
            marks_label(quiz_set.mcq_total_marks)
        )?;
        writeln!(out, "\\begin{{enumerate}}")?;
        for question in &quiz_set.mcq {
            writeln!(
                out,
                "\\item {} \\hfill [{}]",
                question.question,
                marks_label(question.marks)
            )?;
            self.options(out, question, layout)?;
        }
        writeln!(out, "\\end{{enumerate}}")?;
        Ok(())
    }

    fn parts(&self, out: &mut String, parts: &[Part], layout: &Layout) -> Result<()> {
        writeln!(out, "\\begin{{enumerate}}[label=(\\alph*)]")?;
        for part in parts {
            writeln!(out, "\\item {} \\hfill [{}]", part.question, marks_label(part.marks))?;
            writeln!(out, "\\vspace{{{}}}", layout.answer_space)?;
        }
        writeln!(out, "\\end{{enumerate}}")?;
        Ok(())
    }

    fn subjective_question(
        &self,
        out: &mut String,
        question: &ResolvedSubjective,
        layout: &Layout,
    ) -> Result<()> {
        writeln!(
            out,
            "\\item {} \\hfill [{}]",
            question.question,
            marks_label(question.marks)
        )?;
        if question.parts.is_empty() {
            writeln!(out, "\\vspace{{{}}}", layout.answer_space)?;
        } else {
            self.parts(out, &question.parts, layout)?;
        }
        Ok(())
    }

    fn subjective_section(
        &self,
        out: &mut String,
        quiz_set: &QuizSet,
        layout: &Layout,
    ) -> Result<()> {
        writeln!(
            out,
            "\\section*{{\\sectiontitle{{Subjective Questions}} ({})}}",
            marks_label(quiz_set.subjective_total_marks)
        )?;
        writeln!(out, "\\begin{{enumerate}}")?;
        // Numbering continues after the MCQs, matching the answer key
        writeln!(out, "\\setcounter{{enumi}}{{{}}}", quiz_set.mcq.len())?;
        for question in &quiz_set.subjective {
            self.subjective_question(out, question, layout)?;
        }
        writeln!(out, "\\end{{enumerate}}")?;
        Ok(())
    }
}

impl DocumentRenderer for LatexRenderer {
    fn render(&self, quiz_set: &QuizSet, layout: &Layout) -> Result<String> {
        let mut out = String::new();
        self.preamble(&mut out, layout)?;
        writeln!(out, "\\begin{{document}}")?;
        self.title(&mut out, quiz_set)?;
        if !quiz_set.mcq.is_empty() {
            self.mcq_section(&mut out, quiz_set, layout)?;
        }
        if !quiz_set.subjective.is_empty() {
            self.subjective_section(&mut out, quiz_set, layout)?;
        }
        writeln!(out, "\\end{{document}}")?;
        Ok(out)
    }
}
