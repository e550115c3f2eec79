use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;

use clap::Parser;

use sboxsynth::circuit::{State, MAX_GATES, NUM_OUTPUTS};
use sboxsynth::search::{synthesize, UsedBits};
use sboxsynth::ttable::Ttable;
use sboxsynth::{dot, persist, targets};

/// Stack reserved for the synthesis thread; the phase-5 recursion on top of
/// the phase-4 scans needs more than a default worker stack guarantees.
const SYNTH_STACK_SIZE: usize = 0x20_0000;

#[derive(Parser, Debug)]
#[command(name = "sboxsynth")]
#[command(about = "Search for a low gate count circuit implementing an 8-bit S-box")]
struct Args {
    /// State file from a previous run to resume from.
    state: Option<PathBuf>,

    /// Print the loaded state as a Graphviz digraph and exit.
    #[arg(long)]
    dot: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let seed = match &args.state {
        Some(path) => {
            let mut st = persist::load_state(path)?;
            if args.dot {
                dot::write_digraph(io::stdout().lock(), &st)?;
                return Ok(());
            }
            println!("Loaded state from {}", path.display());
            st.set_max_gates(MAX_GATES);
            st
        }
        None => {
            if args.dot {
                return Err("--dot requires a state file argument".into());
            }
            println!("No state file given - synthesizing from scratch.");
            State::new(MAX_GATES)
        }
    };

    let worker = thread::Builder::new()
        .name("synthesize".into())
        .stack_size(SYNTH_STACK_SIZE)
        .spawn(move || synthesize_outputs(seed))?;
    worker
        .join()
        .map_err(|_| "synthesis thread panicked")??;
    Ok(())
}

/// Synthesizes every unsolved output from an independent copy of the seed
/// state, persisting each solution and tightening the shared gate budget so
/// later outputs must come in cheaper.
fn synthesize_outputs(mut seed: State) -> Result<(), persist::StateError> {
    let targets = targets::output_tables(&targets::SBOX_ENC);
    for output in 0..NUM_OUTPUTS {
        if seed.output(output).is_some() {
            println!("Skipping output {output}.");
            continue;
        }
        println!("Synthesizing output {output}...");
        let mut st = seed.clone();
        let Some(id) = synthesize(&mut st, targets[output], Ttable::ONES, UsedBits::new()) else {
            println!("No solution for output {output}.");
            continue;
        };
        st.set_output(output, id);
        assert_eq!(st.table(id), targets[output]);

        let fname = state_file_name(&st);
        persist::save_state(Path::new(&fname), &st)?;
        println!("Saved {fname} ({} gates)", st.num_gates());

        if st.num_gates() < seed.max_gates() {
            seed.set_max_gates(st.num_gates());
            println!("New gate budget: {}", seed.max_gates());
        }
    }
    Ok(())
}

fn state_file_name(st: &State) -> String {
    let solved: Vec<usize> = (0..NUM_OUTPUTS).filter(|&o| st.output(o).is_some()).collect();
    let outs: String = solved.iter().map(|o| o.to_string()).collect();
    format!("{}-{:03}-{}.state", solved.len(), st.num_gates() - 7, outs)
}
