use std::fs;
use std::process;

use sysyc::{cli, elog, log};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let cli = match cli::parse_args(&args) {
        Ok(cli) => cli,
        Err(msg) => {
            elog!("driver", "{}", msg);
            eprintln!("usage: compiler -S -o <output> <input> [-O2]");
            process::exit(1);
        }
    };

    let source = match fs::read_to_string(&cli.input) {
        Ok(source) => source,
        Err(e) => {
            elog!("driver", "cannot read '{}': {}", cli.input.display(), e);
            process::exit(1);
        }
    };

    log!("driver", "compiling {}", cli.input.display());
    if cli.optimize {
        log!("driver", "-O2 requested; handled by the downstream pipeline");
    }

    let module = match sysyc::compile(&source) {
        Ok(module) => module,
        Err(e) => {
            elog!("driver", "{}: {}", e.kind(), e);
            process::exit(1);
        }
    };

    if let Err(e) = fs::write(&cli.output, module.to_string()) {
        elog!("driver", "cannot write '{}': {}", cli.output.display(), e);
        process::exit(1);
    }
    log!("driver", "wrote {}", cli.output.display());
}
