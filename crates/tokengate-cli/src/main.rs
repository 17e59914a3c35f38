fn main() {
    if let Err(e) = tokengate_cli::run() {
        eprintln!("Error: {}", e);
        for hint in e.suggestions() {
            eprintln!("  hint: {hint}");
        }
        std::process::exit(1);
    }
}
