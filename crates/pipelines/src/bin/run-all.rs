//! `run-all`: run every configured pipeline. Arguments are ignored.

fn main() {
    let stdout = std::io::stdout();
    std::process::exit(pipelines::run_all(&mut stdout.lock()));
}
