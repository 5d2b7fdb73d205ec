use std::io;

fn main() {
    chipdeck_cli::logging::init_logging();
    let code = chipdeck_cli::run(std::env::args(), &mut io::stdout(), &mut io::stderr());
    std::process::exit(code);
}
