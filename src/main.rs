fn main() {
    if let Err(err) = schema_drift::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
