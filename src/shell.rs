//! Terminal front end over [`SearchSession`]: every input line becomes the
//! new query, the way each keystroke does in the browser.

use anyhow::Result;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::citation::{citation_text, permalink};
use crate::models::{Paragraph, Provenance, Section};
use crate::search::highlight::highlight;
use crate::session::{SearchSession, SearchView, SessionSettings};
use crate::state::AppState;

const HELP: &str = "\
Digite um termo ou número de parágrafo para pesquisar.
  :s <seção>     filtrar (todos, creed, sacraments, life, prayer ou o nome da seção)
  :copy <id>     copiar o texto do parágrafo
  :link <id>     copiar o link permanente
  :open <link>   abrir um link permanente
  :clear         limpar busca
  :q             sair";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Query(String),
    Section(Section),
    UnknownSection(String),
    CopyText(u32),
    CopyLink(u32),
    Open(String),
    Clear,
    Help,
    Quit,
    Invalid(String),
}

pub fn parse_command(line: &str) -> ShellCommand {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix(':') else {
        let query = line.trim_end_matches(|c: char| c == '\r' || c == '\n');
        return ShellCommand::Query(query.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let id_arg = || arg.trim_start_matches('§').parse::<u32>().ok();

    match name {
        "q" | "quit" => ShellCommand::Quit,
        "h" | "help" => ShellCommand::Help,
        "clear" => ShellCommand::Clear,
        "s" | "section" => match Section::parse(arg) {
            Some(section) => ShellCommand::Section(section),
            None => ShellCommand::UnknownSection(arg.to_string()),
        },
        "copy" => id_arg()
            .map(ShellCommand::CopyText)
            .unwrap_or_else(|| ShellCommand::Invalid(trimmed.to_string())),
        "link" => id_arg()
            .map(ShellCommand::CopyLink)
            .unwrap_or_else(|| ShellCommand::Invalid(trimmed.to_string())),
        "open" if !arg.is_empty() => ShellCommand::Open(arg.to_string()),
        _ => ShellCommand::Invalid(trimmed.to_string()),
    }
}

/// Run the interactive shell until `:q` or end of input.
pub async fn run(state: AppState, start: Option<String>) -> Result<()> {
    let settings = SessionSettings::from(&state.config.search);
    let mut session = SearchSession::new(state.corpus.clone(), state.augmenter.clone(), settings);
    let mut updates = session.subscribe();

    println!("{}", HELP.dimmed());
    if let Some(start) = start {
        if start.chars().all(|c| c.is_ascii_digit()) {
            session.set_query(start);
        } else if session.open_permalink(&start).is_none() {
            eprintln!("Link inválido: {start}");
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    ShellCommand::Quit => break,
                    ShellCommand::Help => println!("{HELP}"),
                    ShellCommand::Query(q) => session.set_query(q),
                    ShellCommand::Clear => session.reset(),
                    ShellCommand::Section(s) => session.set_section(s),
                    ShellCommand::UnknownSection(s) => eprintln!("Seção desconhecida: {s}"),
                    ShellCommand::Open(link) => {
                        if session.open_permalink(&link).is_none() {
                            eprintln!("Link inválido: {link}");
                        }
                    }
                    ShellCommand::CopyText(id) => {
                        match find_displayed(&session.view(), &state, id) {
                            Some(p) => copy_to_clipboard(&citation_text(&state.config.corpus_name, &p)),
                            None => eprintln!("Parágrafo §{id} não está nos resultados"),
                        }
                    }
                    ShellCommand::CopyLink(id) => {
                        copy_to_clipboard(&permalink(&state.config.public_base_url, id));
                    }
                    ShellCommand::Invalid(cmd) => eprintln!("Comando inválido: {cmd} (:help)"),
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                updates.borrow_and_update();
                print_view(&session.view());
            }
        }
    }
    Ok(())
}

fn find_displayed(view: &SearchView, state: &AppState, id: u32) -> Option<Paragraph> {
    view.results
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .or_else(|| state.corpus.get(id).cloned())
}

/// Fire-and-forget: clipboard failures are only logged.
fn copy_to_clipboard(text: &str) {
    match arboard::Clipboard::new().and_then(|mut c| c.set_text(text.to_string())) {
        Ok(()) => println!("{}", "Copiado.".green()),
        Err(e) => tracing::warn!("Clipboard unavailable: {e}"),
    }
}

fn print_view(view: &SearchView) {
    println!();
    if view.query.trim().is_empty() {
        println!(
            "{}",
            format!("{} parágrafo(s) em {}", view.results.len(), view.section.label()).dimmed()
        );
    } else if !view.results.is_empty() {
        println!("{}", format!("{} resultado(s)", view.results.len()).dimmed());
    }

    for p in &view.results {
        print_paragraph(p, &view.query);
    }

    if view.remote_loading {
        println!("{}", "Buscando na base de conhecimento...".yellow());
    }
    if let Some(err) = &view.remote_error {
        println!("{}", err.red());
    }
    if view.is_no_results() {
        println!("Nenhum resultado encontrado para \"{}\".", view.query.trim());
    }
}

fn print_paragraph(p: &Paragraph, query: &str) {
    let mut header = format!("§{}", p.id).yellow().bold().to_string();
    if let Some(section) = &p.section {
        header.push_str(&format!("  {}", section.to_uppercase().dimmed()));
    }
    if p.source == Some(Provenance::Remote) {
        header.push_str(&format!("  {}", "IA".magenta()));
    }
    println!("\n{header}");

    let body: String = highlight(&p.text, query)
        .into_iter()
        .map(|segment| {
            if segment.is_match {
                segment.text.black().on_yellow().to_string()
            } else {
                segment.text.to_string()
            }
        })
        .collect();
    println!("{body}");

    if let Some(refs) = p.bible_references.as_ref().filter(|r| !r.is_empty()) {
        println!("{}", refs.join("; ").italic().dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_line_is_query() {
        assert_eq!(parse_command("Eucaristia\n"), ShellCommand::Query("Eucaristia".into()));
        assert_eq!(parse_command("  fé "), ShellCommand::Query("  fé ".into()));
        assert_eq!(parse_command(""), ShellCommand::Query(String::new()));
    }

    #[test]
    fn test_section_command() {
        assert_eq!(parse_command(":s sacraments"), ShellCommand::Section(Section::Sacraments));
        assert_eq!(parse_command(":section Oração Cristã"), ShellCommand::Section(Section::Prayer));
        assert_eq!(
            parse_command(":s liturgia"),
            ShellCommand::UnknownSection("liturgia".into())
        );
    }

    #[test]
    fn test_copy_commands() {
        assert_eq!(parse_command(":copy 27"), ShellCommand::CopyText(27));
        assert_eq!(parse_command(":copy §1213"), ShellCommand::CopyText(1213));
        assert_eq!(parse_command(":link 2558"), ShellCommand::CopyLink(2558));
        assert!(matches!(parse_command(":copy"), ShellCommand::Invalid(_)));
    }

    #[test]
    fn test_misc_commands() {
        assert_eq!(parse_command(":q"), ShellCommand::Quit);
        assert_eq!(parse_command(":clear"), ShellCommand::Clear);
        assert_eq!(parse_command(":help"), ShellCommand::Help);
        assert_eq!(
            parse_command(":open #/paragraph/27"),
            ShellCommand::Open("#/paragraph/27".into())
        );
        assert!(matches!(parse_command(":open"), ShellCommand::Invalid(_)));
        assert!(matches!(parse_command(":bogus"), ShellCommand::Invalid(_)));
    }
}
