use anyhow::{Context, Result};
use jsonval::{Parser, DEFAULT_MAX_DEPTH};
use std::fs::{self, File};
use std::io::{stdin, Read, Write};

#[macro_use]
extern crate clap;
use clap::App;

fn main() -> Result<()> {
    let yaml = load_yaml!("main.yml");
    let matches = App::from_yaml(yaml).get_matches();
    let max_depth = match matches.value_of("max_depth") {
        Some(n) => n
            .parse()
            .with_context(|| format!("invalid --max-depth: `{}`", n))?,
        None => DEFAULT_MAX_DEPTH,
    };
    let check = matches.is_present("check");
    if let Some(path) = matches.value_of_os("json_file") {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.to_string_lossy()))?;
        let result = format(&text, max_depth)?;
        if check {
            return Ok(());
        }
        if matches.is_present("in_place") {
            let mut f = File::create(path)?;
            writeln!(f, "{}", result)?;
        } else {
            println!("{}", result);
        }
    } else {
        let mut text = String::new();
        stdin().lock().read_to_string(&mut text)?;
        let result = format(&text, max_depth)?;
        if !check {
            println!("{}", result);
        }
    }
    Ok(())
}

fn format(text: &str, max_depth: usize) -> Result<String> {
    let v = Parser::new(text).with_max_depth(max_depth).parse()?;
    Ok(v.to_string())
}
