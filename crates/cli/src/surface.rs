//! Interactive prompts on the controlling terminal

use crate::display;
use async_trait::async_trait;
use hostfit_core::executor::InstallEvent;
use hostfit_core::program::ProgramKind;
use hostfit_core::surface::{
    AlternativeChoice, AlternativePrompt, AlternativeResponse, ClassificationPrompt,
    ClassificationResponse, DependencyPrompt, DependencyResponse, InteractionSurface, ItemStatus,
    WarningPrompt, WarningResponse,
};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing::debug;

/// One line typed at a prompt, or how the prompt ended without one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Line(String),
    /// End of input: the prompt's default applies
    Closed,
    /// Ctrl-C at the prompt: the prompt's exit or cancel button applies
    Interrupted,
}

/// Reads answers line by line from stdin.
///
/// Ctrl-C is handled by hostfit once the first prompt or install has listened for it,
/// so every prompt also listens for it and treats it as the exit or cancel answer.
pub struct TerminalSurface {
    input: Mutex<Lines<BufReader<Stdin>>>,
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            input: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    async fn ask(&self, question: &str) -> Answer {
        print!("{} ", question);
        let _ = std::io::stdout().flush();
        let mut input = self.input.lock().await;
        tokio::select! {
            line = input.next_line() => match line {
                Ok(Some(line)) => Answer::Line(line.trim().to_string()),
                Ok(None) => {
                    println!();
                    Answer::Closed
                }
                Err(e) => {
                    debug!("Failed to read answer: {}", e);
                    Answer::Closed
                }
            },
            _ = interrupted() => {
                println!();
                Answer::Interrupted
            }
        }
    }

    async fn confirm(&self, question: &str) -> bool {
        match self.ask(&format!("{} [y/N]", question)).await {
            Answer::Line(answer) => parse_yes(&answer),
            Answer::Closed | Answer::Interrupted => false,
        }
    }
}

/// Resolves on Ctrl-C; never resolves if the signal cannot be listened for
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        debug!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[async_trait]
impl InteractionSurface for TerminalSurface {
    async fn resolve_dependencies(&self, prompt: &DependencyPrompt) -> DependencyResponse {
        print!("{}", display::render_dependency_prompt(prompt));
        let installable = prompt
            .items
            .iter()
            .any(|i| i.auto_installable && i.status != ItemStatus::Installed);

        let mut question = String::from("\n");
        if installable {
            question.push_str("[i]nstall (or: i <name>...), ");
        }
        question.push_str(if prompt.required {
            "[c]ontinue once installed, [e]xit:"
        } else {
            "[c]ontinue, [s]kip and don't ask again, [e]xit:"
        });

        loop {
            let answer = self.ask(&question).await;
            if let Some(response) = dependency_response(&answer, prompt) {
                return response;
            }
            println!("Unrecognised answer '{}'", answer_text(&answer));
        }
    }

    async fn classify_program(&self, prompt: &ClassificationPrompt) -> ClassificationResponse {
        print!("{}", display::render_classification_prompt(prompt));
        loop {
            let answer = self
                .ask("[g]ame, [a]pplication, Enter for default, [x] cancel:")
                .await;
            if let Some(response) = classification_response(&answer) {
                return response;
            }
            println!("Unrecognised answer '{}'", answer_text(&answer));
        }
    }

    async fn choose_alternative(&self, prompt: &AlternativePrompt) -> AlternativeResponse {
        print!("{}", display::render_alternative_prompt(prompt));
        let choice = loop {
            let answer = self
                .ask("[i]nstall, [c]ontinue with original, [m]ore info, [x] cancel:")
                .await;
            if let Some(choice) = alternative_choice(&answer) {
                break choice;
            }
            println!("Unrecognised answer '{}'", answer_text(&answer));
        };

        if choice == AlternativeChoice::Cancel {
            return AlternativeResponse::new(choice);
        }
        AlternativeResponse {
            choice,
            suppress_future: self.confirm("Don't suggest alternatives again?").await,
        }
    }

    async fn confirm_warning(&self, prompt: &WarningPrompt) -> WarningResponse {
        print!("{}", display::render_warning_prompt(prompt));
        let answer = self.ask("[p]roceed, [x] cancel:").await;
        let proceed = match &answer {
            Answer::Line(answer) => !matches!(answer.to_lowercase().as_str(), "x" | "cancel"),
            Answer::Closed => true,
            Answer::Interrupted => false,
        };
        if answer == Answer::Interrupted {
            return WarningResponse {
                proceed,
                suppress_future: false,
            };
        }
        WarningResponse {
            proceed,
            suppress_future: self.confirm(&format!("{}?", prompt.opt_out_label)).await,
        }
    }

    async fn install_event(&self, package: &str, event: &InstallEvent) {
        match event {
            InstallEvent::Progress(line) => println!("   │ {}", line),
            InstallEvent::Succeeded => println!("✅ Installed {}", package),
            InstallEvent::Failed(reason) => println!("❌ {}: {}", package, reason),
        }
    }

    async fn cancel_requested(&self) {
        interrupted().await;
        println!("\n⏹  Cancelling installation...");
    }
}

fn answer_text(answer: &Answer) -> &str {
    match answer {
        Answer::Line(line) => line,
        Answer::Closed | Answer::Interrupted => "",
    }
}

fn parse_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn default_dependency_response(prompt: &DependencyPrompt) -> DependencyResponse {
    if prompt.required {
        DependencyResponse::Exit
    } else {
        DependencyResponse::Continue {
            suppress_future: false,
        }
    }
}

pub fn dependency_response(answer: &Answer, prompt: &DependencyPrompt) -> Option<DependencyResponse> {
    match answer {
        Answer::Line(line) => parse_dependency_answer(line, prompt),
        Answer::Closed => Some(default_dependency_response(prompt)),
        Answer::Interrupted => Some(DependencyResponse::Exit),
    }
}

pub fn classification_response(answer: &Answer) -> Option<ClassificationResponse> {
    match answer {
        Answer::Line(line) => parse_classification_answer(line),
        Answer::Closed => Some(ClassificationResponse::AcceptDefault),
        Answer::Interrupted => Some(ClassificationResponse::Cancel),
    }
}

pub fn alternative_choice(answer: &Answer) -> Option<AlternativeChoice> {
    match answer {
        Answer::Line(line) => parse_alternative_answer(line),
        Answer::Closed => Some(AlternativeChoice::Continue),
        Answer::Interrupted => Some(AlternativeChoice::Cancel),
    }
}

/// `i` installs every one-click item still missing; `i wine lutris` picks items
pub fn parse_dependency_answer(answer: &str, prompt: &DependencyPrompt) -> Option<DependencyResponse> {
    let mut words = answer.split_whitespace();
    let head = words.next().unwrap_or("").to_lowercase();
    match head.as_str() {
        "i" | "install" => {
            let picked: Vec<String> = words.map(str::to_string).collect();
            let names = if picked.is_empty() {
                prompt
                    .items
                    .iter()
                    .filter(|i| i.auto_installable && i.status != ItemStatus::Installed)
                    .map(|i| i.name.clone())
                    .collect()
            } else {
                picked
            };
            Some(DependencyResponse::Install(names))
        }
        "c" | "continue" => Some(DependencyResponse::Continue {
            suppress_future: false,
        }),
        "s" | "skip" if !prompt.required => Some(DependencyResponse::Continue {
            suppress_future: true,
        }),
        "e" | "exit" => Some(DependencyResponse::Exit),
        "" => Some(default_dependency_response(prompt)),
        _ => None,
    }
}

pub fn parse_classification_answer(answer: &str) -> Option<ClassificationResponse> {
    match answer.trim().to_lowercase().as_str() {
        "" => Some(ClassificationResponse::AcceptDefault),
        "g" | "game" => Some(ClassificationResponse::Choose(ProgramKind::Game)),
        "a" | "app" | "application" => {
            Some(ClassificationResponse::Choose(ProgramKind::Application))
        }
        "x" | "cancel" => Some(ClassificationResponse::Cancel),
        _ => None,
    }
}

pub fn parse_alternative_answer(answer: &str) -> Option<AlternativeChoice> {
    match answer.trim().to_lowercase().as_str() {
        "i" | "install" => Some(AlternativeChoice::Install),
        "" | "c" | "continue" => Some(AlternativeChoice::Continue),
        "m" | "more" | "info" => Some(AlternativeChoice::MoreInfo),
        "x" | "cancel" => Some(AlternativeChoice::Cancel),
        _ => None,
    }
}
