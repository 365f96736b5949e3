//! Interactive question prompt.

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use smartpdf_rag::{RagError, Session};
use smartpdf_telemetry::StageTimings;

use crate::report;

/// What the prompt should do with one line of input.
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    Quit,
    Skip,
    Question(&'a str),
}

pub fn classify(line: &str) -> Input<'_> {
    match line.trim() {
        "" => Input::Skip,
        "exit" | "quit" | ":q" => Input::Quit,
        question => Input::Question(question),
    }
}

/// Ask one question and print the answer.
pub async fn ask_and_print(session: &Session, question: &str, timings: Option<&StageTimings>) {
    if let Some(timings) = timings {
        timings.take();
    }
    match session.ask(question).await {
        Ok(answer) => println!("{}\n", report::answer(&answer)),
        Err(RagError::EmptyQuestion) => println!("{}\n", RagError::EmptyQuestion),
        Err(e) => eprintln!("Error: {e}\n"),
    }
    if let Some(timings) = timings {
        print!("{}", report::timings(&timings.take()));
    }
}

/// Read questions until EOF, Ctrl-C or `exit`.
pub async fn run_console(session: &Session, timings: Option<&StageTimings>) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    println!("Ask a question about your documents (type 'exit' to quit).\n");

    loop {
        let line = match rl.readline("❓ ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        match classify(&line) {
            Input::Quit => break,
            Input::Skip => continue,
            Input::Question(question) => {
                let _ = rl.add_history_entry(question);
                ask_and_print(session, question, timings).await;
            }
        }
    }

    Ok(())
}
