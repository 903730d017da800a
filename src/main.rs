fn main() {
    if let Err(err) = linkvault::entry() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
