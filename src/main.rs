use std::path::PathBuf;

use anyhow::Result;

mod demo;

fn main() -> Result<()> {
    pretty_env_logger::init();

    let model = std::env::args_os().nth(1).map(PathBuf::from);
    let mut demo = demo::DemoState::new(model.as_deref())?;
    demo.run()?;

    Ok(())
}
