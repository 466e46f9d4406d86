use clap::Parser;
use std::error::Error;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::process;
use tmsim::{
    lint, parse_rule, parse_states, parse_symbols, Definition, DefinitionBuilder,
    DefinitionLoader, EngineConfig, MachineCatalog, TraceWriter, TuringMachine,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Runs a single-tape deterministic Turing machine over an input string.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  tmsim --machine machines/equal-counts.tm --input 0011
  tmsim --builtin binary-increment --input 1011 --trace
  cat machines/even-ones.tm | tmsim --input 1010 --json")]
struct Cli {
    /// Path to a machine definition file (.tm). Definitions can also be piped on stdin.
    #[clap(short, long, conflicts_with_all = ["builtin", "interactive"])]
    machine: Option<PathBuf>,

    /// Name of a built-in machine (see --list).
    #[clap(short, long, conflicts_with = "interactive")]
    builtin: Option<String>,

    /// Enter the definition interactively, one prompt at a time.
    #[clap(long)]
    interactive: bool,

    /// List the built-in machines and exit.
    #[clap(short, long)]
    list: bool,

    /// The input string written on the tape starting at position 0.
    #[clap(short, long)]
    input: Option<String>,

    /// Print every configuration of the run.
    #[clap(short, long)]
    trace: bool,

    /// Maximum number of steps before the run is halted.
    #[clap(long, env = "TMSIM_STEP_LIMIT", default_value_t = tmsim::DEFAULT_STEP_LIMIT)]
    step_limit: u64,

    /// Print the run result as JSON.
    #[clap(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Executes the command and returns the process exit code: 0 when the machine accepts,
/// 2 when it halts without accepting.
fn run(cli: Cli) -> Result<i32, Box<dyn Error>> {
    if cli.list {
        for index in 0..MachineCatalog::count() {
            let info = MachineCatalog::info(index)?;
            println!(
                "{}: {} ({} states, {} rules)",
                info.index, info.name, info.state_count, info.transition_count
            );
        }
        return Ok(0);
    }

    let definition = load_definition(&cli)?;

    for warning in lint(&definition) {
        eprintln!("Warning: {}", warning);
    }

    let input = match (&cli.input, cli.interactive) {
        (Some(input), _) => input.clone(),
        (None, true) => {
            let stdin = io::stdin();
            prompt(
                &mut stdin.lock(),
                &mut io::stdout(),
                "Enter the input string for the tape: ",
            )?
            .unwrap_or_default()
        }
        (None, false) => String::new(),
    };

    debug!(machine = definition.name(), %input, "running");

    let mut machine =
        TuringMachine::with_config(definition, EngineConfig::with_step_limit(cli.step_limit));

    let result = if cli.trace {
        // Keep stdout clean for the JSON document.
        let sink: Box<dyn Write> = if cli.json {
            Box::new(io::stderr())
        } else {
            Box::new(io::stdout())
        };
        let mut writer = TraceWriter::new(sink);
        let result = machine.run_observed(&input, &mut writer)?;
        if let Some(e) = writer.take_error() {
            return Err(e.into());
        }
        result
    } else {
        machine.run(&input)?
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if !cli.trace {
        println!("{}", result.outcome);
        println!("Final tape content: {}", result.final_tape);
    }

    Ok(if result.outcome.is_accepted() { 0 } else { 2 })
}

/// Resolves the definition from a file, a built-in, the interactive prompts, or stdin.
fn load_definition(cli: &Cli) -> Result<Definition, Box<dyn Error>> {
    if let Some(path) = &cli.machine {
        return Ok(DefinitionLoader::load_definition(path)?);
    }

    if let Some(name) = &cli.builtin {
        return Ok(MachineCatalog::get_by_name(name)?);
    }

    if cli.interactive {
        let stdin = io::stdin();
        return collect_definition(&mut stdin.lock(), &mut io::stdout());
    }

    if atty::isnt(atty::Stream::Stdin) {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        return Ok(DefinitionLoader::load_definition_from_string(&content)?);
    }

    Err("no machine given: use --machine, --builtin, --interactive, or pipe a definition".into())
}

/// Writes `label` and reads one line, without its line terminator. Returns `None` at end of
/// input.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> io::Result<Option<String>> {
    write!(output, "{}", label)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
}

/// Reads a required answer, treating end of input as an error.
fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> Result<String, Box<dyn Error>> {
    prompt(input, output, label)?.ok_or_else(|| "unexpected end of input".into())
}

/// Collects a definition through prompts.
///
/// States and alphabets are validated as soon as they are complete. Rules are then read one
/// per line in the form `state,read,write,direction,next` until `end`; a rule that does not
/// parse or that breaks an invariant is reported and skipped.
fn collect_definition<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<Definition, Box<dyn Error>> {
    writeln!(output, "--- Turing machine definition ---")?;

    let states = parse_states(&ask(
        input,
        output,
        "States, comma separated (e.g. q0,q1,qf): ",
    )?)?;
    let input_alphabet = parse_symbols(&ask(input, output, "Input alphabet (e.g. 0,1): ")?)?;
    let tape_alphabet = parse_symbols(&ask(
        input,
        output,
        "Tape alphabet, including the input alphabet (e.g. 0,1,X,_): ",
    )?)?;
    let initial_state = ask(input, output, "Initial state (e.g. q0): ")?;
    let accept_states = parse_states(&ask(input, output, "Accept states (e.g. qf): ")?)?;
    let blank = match parse_symbols(&ask(input, output, "Blank symbol (e.g. _): ")?)?[..] {
        [blank] => blank,
        _ => return Err("the blank must be exactly one symbol".into()),
    };

    let mut builder: DefinitionBuilder = Definition::builder()
        .name("interactive")
        .states(states)
        .input_alphabet(input_alphabet)
        .tape_alphabet(tape_alphabet)
        .initial_state(initial_state.trim())
        .accept_states(accept_states)
        .blank(blank);

    builder.clone().build()?;

    writeln!(output)?;
    writeln!(output, "--- Transition rules ---")?;
    writeln!(output, "Format: state,read,write,direction (L or R),next")?;
    writeln!(output, "Example: q0,1,X,R,q1")?;
    writeln!(output, "Type 'end' when done.")?;

    while let Some(line) = prompt(input, output, "> ")? {
        if line.trim().eq_ignore_ascii_case("end") {
            break;
        }

        let rule = match parse_rule(&line) {
            Ok(rule) => rule,
            Err(e) => {
                writeln!(output, "Error: {}. Try again.", e)?;
                continue;
            }
        };

        let summary = format!(
            "({}, {}) -> ({}, {}, {})",
            rule.state, rule.read, rule.write, rule.direction, rule.next_state
        );
        let candidate = rule.apply(builder.clone());

        match candidate.clone().build() {
            Ok(_) => {
                builder = candidate;
                writeln!(output, "Rule added: {}", summary)?;
            }
            Err(e) => writeln!(output, "Error: {}. Try again.", e)?,
        }
    }

    Ok(builder.build()?)
}
