//! Prompt construction for the role agents.
//!
//! Each builder produces the full instruction text for one phase. The
//! orchestrator never looks inside these strings; they exist so the CLI has
//! something to hand the invoker.

use crate::phase::PhaseKind;

/// Everything a prompt needs to know about the run.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub project: &'a str,
    pub project_path: &'a str,
    pub task: &'a str,
}

/// Build the prompt for one phase kind.
pub fn build(kind: PhaseKind, ctx: &PromptContext<'_>) -> String {
    match kind {
        PhaseKind::PmAnalysis => pm_analysis(ctx),
        PhaseKind::Architecture => architecture(ctx),
        PhaseKind::UiDesign => ui_design(ctx),
        PhaseKind::Implementation => implementation(ctx),
        PhaseKind::Testing => testing(ctx),
    }
}

fn header(ctx: &PromptContext<'_>, role_line: &str) -> String {
    format!(
        "{role_line}\n\nProject: {}\nProject path: {}\n\nTask: {}\n",
        ctx.project, ctx.project_path, ctx.task
    )
}

fn pm_analysis(ctx: &PromptContext<'_>) -> String {
    format!(
        r#"{}
Deliverables:
1. Requirement overview
2. User stories (3-5)
3. Feature list, ordered by priority
4. Core business flows
5. Edge cases to watch
"#,
        header(ctx, "You are the product manager. Analyze the following requirement.")
    )
}

fn architecture(ctx: &PromptContext<'_>) -> String {
    format!(
        r#"{}
Deliverables:
1. Technology choices
2. Module breakdown
3. Database design (where applicable)
4. API design (where applicable)
5. Architecture diagram (Mermaid format)
"#,
        header(ctx, "You are the architect. Design the architecture for the following task.")
    )
}

fn ui_design(ctx: &PromptContext<'_>) -> String {
    format!(
        r#"{}
Deliverables:
1. Page layout (described in text)
2. Interaction flows
3. Component suggestions
4. User-experience notes
"#,
        header(ctx, "You are the UI designer. Design the interface for the following task.")
    )
}

fn implementation(ctx: &PromptContext<'_>) -> String {
    format!(
        r#"{}
Steps:
1. Study the project structure and existing code first
2. Write the implementation
3. Follow the project's code conventions

Provide the complete code.
"#,
        header(ctx, "You are the software engineer. Implement the following task.")
    )
}

fn testing(ctx: &PromptContext<'_>) -> String {
    format!(
        r#"{}
Deliverables:
1. Test-case list (5-10 cases)
2. Steps and expected results for each case
3. Boundary conditions
"#,
        header(ctx, "You are the test engineer. Write test cases for the following task.")
    )
}
