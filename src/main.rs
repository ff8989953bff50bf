fn main() {
    if let Err(err) = threadline::cli::main() {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
}
