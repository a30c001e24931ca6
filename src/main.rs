fn main() {
    if let Err(err) = tasky_lib::run() {
        eprintln!("tasky: {err:#}");
        std::process::exit(1);
    }
}
