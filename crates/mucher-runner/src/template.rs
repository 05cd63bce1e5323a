//! The LaTeX exam template.

use std::path::Path;

use anyhow::{Context, Result};

use mucher_core::model::GradingPolicy;

/// Template file name inside the working area.
pub const TEMPLATE_FILE: &str = "exam.tex";

const BUILTIN_TEMPLATE: &str = r#"\documentclass[11pt,a4paper]{article}
\usepackage{amsfonts,latexsym}
\usepackage[italian]{babel}
\usepackage{amsmath}
\usepackage{amssymb}
\usepackage{fullpage}
\usepackage{graphicx}
\usepackage{wrapfig}
\usepackage{siunitx}
\usepackage{physics}
\usepackage{multicol}
\usepackage{geometry}
\usepackage{microtype}

\geometry{top=0.7cm, bottom=0.7cm, left=1cm, right=1cm}

\begin{document}

\pagestyle{empty}

\newcommand{\mcglobalheader}{
}

\newcommand{\boxt}{{\Huge $\square$ }}

\newcommand{\mcpaperheader}{
\ \\
TESTO NUMERO \mcserialnumber. STUDENTE: \\
{\textbf{Tempo a disposizione: XXXX.} In ognuna delle seguenti domande una sola opzione \`e corretta.
\\ Risposta corretta: @POINTS_CORRECT@ punti. Risposta non data: @POINTS_MISSING@ punti. Risposta errata: @POINTS_INCORRECT@ punti.}

\begin{center}
{\Large Verifica di XXX n.XX: XXXX}\\
Classe XX, XX/XX/20XX.
\end{center}
}

\newcommand{\mcpaperfooter}{

\newpage
}

\newcommand{\mcquestionheader}{\noindent{\bf \mcquestionnumber}. }

\newcommand{\mcquestionfooter}{}

\input mc-output.tex

\end{document}
"#;

/// Built-in template with the scoring legend taken from `policy`.
pub fn render_template(policy: &GradingPolicy) -> String {
    BUILTIN_TEMPLATE
        .replace("@POINTS_CORRECT@", &policy.points_correct.to_string())
        .replace("@POINTS_MISSING@", &policy.points_missing.to_string())
        .replace("@POINTS_INCORRECT@", &policy.points_incorrect.to_string())
}

/// Template text for a run: the custom file when given, else the built-in one.
pub fn load_template(custom: Option<&Path>, policy: &GradingPolicy) -> Result<String> {
    match custom {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read template: {}", path.display())),
        None => Ok(render_template(policy)),
    }
}
