//! Short alias binary (`lv`) that forwards to the `linkvault` library.

fn main() {
    if let Err(err) = linkvault::entry() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
