mod cli;
mod run;
mod viewer;

use anyhow::Result;

fn main() -> Result<()> {
    install_panic_reporter();
    run::run(cli::parse())
}

/// Last line of defense around the viewer: a render-time panic prints a
/// short readable message and a path back to a known-good entry point
/// before the default hook dumps the backtrace.
fn install_panic_reporter() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        eprintln!("lightwell crashed while rendering.");
        eprintln!("Run `lightwell --help` for a known-good starting point.");
        default_hook(info);
    }));
}
