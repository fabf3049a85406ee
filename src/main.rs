use anyhow::Context;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt};
use slink::{parse_all, EvaluationContext};

const PRELUDE_VARIABLE: &str = "SLINK_PRELUDE";

struct Options {
    interactive: bool,
    files: Vec<String>,
}

impl Options {
    fn from_args(arguments: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut options = Options { interactive: false, files: vec![] };
        for argument in arguments {
            match argument.as_str() {
                "-i" => options.interactive = true,
                flag if flag.starts_with('-') => anyhow::bail!("unknown option '{}'\nusage: slink [-i] [FILE...]", flag),
                _ => options.files.push(argument),
            }
        }
        Ok(options)
    }
}

async fn query(stdout: &mut io::Stdout, lines: &mut io::Lines<io::BufReader<io::Stdin>>, prompt: &str) -> io::Result<Option<String>> {
    stdout.write_all(prompt.as_bytes()).await?;
    stdout.flush().await?;
    lines.next_line().await
}

// Every form is evaluated on its own, so an error does not swallow the forms after it
fn evaluate_forms(context: &EvaluationContext, source: &str) -> Result<(), slink::SlinkError> {
    for form in parse_all(source)? {
        match context.evaluate(&form) {
            Ok(value) => println!("{}", value),
            Err(error) => eprintln!("Error: {}", error),
        }
    }
    Ok(())
}

async fn repl(context: &EvaluationContext) -> anyhow::Result<()> {
    let mut lines = io::BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    // Lines pile up here until they hold complete expressions
    let mut pending = String::new();
    loop {
        let prompt = if pending.is_empty() { "> " } else { "  " };
        let Some(line) = query(&mut stdout, &mut lines, prompt).await.context("could not read from stdin")? else { break };

        pending.push_str(&line);
        pending.push('\n');
        if pending.trim().is_empty() {
            pending.clear();
            continue;
        }

        match evaluate_forms(context, &pending) {
            Err(error) if error.is_incomplete() => continue,
            Err(error) => eprintln!("Error: {}", error),
            Ok(()) => {},
        }
        pending.clear();
    }

    if !pending.trim().is_empty() {
        if let Err(error) = evaluate_forms(context, &pending) {
            eprintln!("Error: {}", error);
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let options = Options::from_args(std::env::args().skip(1))?;
    let mut context = EvaluationContext::new().context("bootstrap failed")?;

    if let Some(prelude) = std::env::var_os(PRELUDE_VARIABLE) {
        context.load_file(&prelude)
            .with_context(|| format!("could not load prelude {}", prelude.to_string_lossy()))?;
    }

    for file in &options.files {
        context.load_file(file).with_context(|| format!("could not load {}", file))?;
    }

    if options.files.is_empty() || options.interactive {
        repl(&context).await?;
    }

    Ok(())
}
