fn main() {
    if let Err(err) = quillchat::cli::main() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
