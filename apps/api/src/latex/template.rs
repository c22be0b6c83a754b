//! Template Macro Library: the one preamble and macro set every emitted document uses.
//!
//! ARCHITECTURAL RULE: no other module defines LaTeX macros. The builder, the
//! recovery pipeline and the fallback path all go through `template()` / `wrap()`,
//! so a body can never reference a macro this preamble does not define.

/// Token replaced by the document body. It is a LaTeX comment, so an
/// unsubstituted skeleton still compiles.
pub const BODY_PLACEHOLDER: &str = "%__BODY__";

pub const DOCUMENT_CLASS: &str = "\\documentclass";
pub const BEGIN_DOCUMENT: &str = "\\begin{document}";
pub const END_DOCUMENT: &str = "\\end{document}";

/// Sentinel pair the free-form prompt asks the generator to wrap its document in.
pub const BEGIN_SENTINEL: &str = "%__BEGIN_LATEX__";
pub const END_SENTINEL: &str = "%__END_LATEX__";

/// Fixed phrase carried by the fallback body. Callers and tests use it to
/// recognise that the static placeholder document was substituted.
pub const FALLBACK_NOTICE: &str = "This is a placeholder document.";

const SKELETON: &str = r#"\documentclass[letterpaper,11pt]{article}

% Core packages (ATS-friendly)
\usepackage{latexsym}
\usepackage[empty]{fullpage}
\usepackage{titlesec}
\usepackage{marvosym}
\usepackage[usenames,dvipsnames]{color}
\usepackage{verbatim}
\usepackage{enumitem}
\usepackage[hidelinks]{hyperref}
\usepackage{fancyhdr}
\usepackage[english]{babel}
\usepackage{tabularx}
\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}
\usepackage{lmodern}
\input{glyphtounicode}

% Page formatting and margins
\pagestyle{fancy}
\fancyhf{}
\fancyfoot{}
\renewcommand{\headrulewidth}{0pt}
\renewcommand{\footrulewidth}{0pt}
\setlength{\headheight}{14pt}
\addtolength{\oddsidemargin}{-0.5in}
\addtolength{\evensidemargin}{-0.5in}
\addtolength{\textwidth}{1in}
\addtolength{\topmargin}{-.5in}
\addtolength{\textheight}{1.0in}
\urlstyle{same}
\raggedbottom
\raggedright
\setlength{\tabcolsep}{0in}
\setlength{\parindent}{0pt}

% Section title formatting
\titleformat{\section}{
  \vspace{-4pt}\scshape\raggedright\large
}{}{0em}{}[\color{black}\titlerule \vspace{-5pt}]

% Machine-readable PDF output
\pdfgentounicode=1

%-------------------------
% Resume macros
\newcommand{\resumeItem}[1]{
  \item\small{
    {#1 \vspace{-2pt}}
  }
}

\newcommand{\resumeSubheading}[4]{
  \vspace{-2pt}\item
    \begin{tabular*}{0.97\textwidth}[t]{l@{\extracolsep{\fill}}r}
      \textbf{#1} & #2 \\
      \textit{\small#3} & \textit{\small #4} \\
    \end{tabular*}\vspace{-7pt}
}

\newcommand{\resumeSubSubheading}[2]{
  \item
    \begin{tabular*}{0.97\textwidth}{l@{\extracolsep{\fill}}r}
      \textit{\small#1} & \textit{\small #2} \\
    \end{tabular*}\vspace{-7pt}
}

\newcommand{\resumeProjectHeading}[2]{
  \item
    \begin{tabular*}{0.97\textwidth}{l@{\extracolsep{\fill}}r}
      \small#1 & #2 \\
    \end{tabular*}\vspace{-7pt}
}

\newcommand{\resumeSubItem}[1]{\resumeItem{#1}\vspace{-4pt}}

\renewcommand\labelitemii{$\vcenter{\hbox{\tiny$\bullet$}}$}

\newcommand{\resumeSubHeadingListStart}{\begin{itemize}[leftmargin=0.15in, label={}]}
\newcommand{\resumeSubHeadingListEnd}{\end{itemize}}
\newcommand{\resumeItemListStart}{\begin{itemize}}
\newcommand{\resumeItemListEnd}{\end{itemize}\vspace{-5pt}}

\newcommand{\resumeSkillItem}[2]{
  \item{\textbf{#1:} #2}
}

%-------------------------
\begin{document}

%__BODY__

\end{document}
"#;

const FALLBACK_BODY: &str = r#"\begin{center}
    \textbf{\Huge \scshape Resume} \\ \vspace{1pt}
    \small Please provide your resume content to generate a formatted PDF.
\end{center}

\section{Notice}
\begin{itemize}[leftmargin=0.15in, label={}]
    \item This is a placeholder document.
    \item The resume content could not be converted automatically.
    \item Please regenerate your resume to get the tailored content.
\end{itemize}"#;

/// Returns the full document skeleton with a single `%__BODY__` placeholder.
pub fn template() -> &'static str {
    SKELETON
}

/// Substitutes `body` into the skeleton. A blank body is replaced by the canned
/// notice body, so the result is never an empty document.
pub fn wrap(body: &str) -> String {
    let body = body.trim();
    let body = if body.is_empty() { FALLBACK_BODY } else { body };
    SKELETON.replacen(BODY_PLACEHOLDER, body, 1)
}

/// The static placeholder document substituted when every other path fails.
pub fn fallback_document() -> String {
    wrap("")
}

/// Splits the skeleton around the body placeholder: (preamble through
/// `\begin{document}`, `\end{document}` tail). Used by the builder so it can
/// stream sections between the two halves.
pub(crate) fn skeleton_halves() -> (&'static str, &'static str) {
    SKELETON
        .split_once(BODY_PLACEHOLDER)
        .unwrap_or((SKELETON, ""))
}
