//! Entrypoint for CLI
use std::{
    env, fs,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use jackc::{compile, CompilerOptions, DoResultPolicy};
use log::{error, info, warn, LevelFilter};

static USAGE: &str = r#"
usage: jackc [-v] [--keep-do-result] PATH

PATH is a .jack file, or a directory whose .jack files are each compiled
to a .vm file of the same name.

options:
    -v                  Log each class and subroutine as it is compiled
    --keep-do-result    Do not emit `pop temp 0` after `do` statements

examples:
    jackc Main.jack
    jackc projects/Pong
"#;

const SOURCE_EXTENSION: &str = "jack";
const OUTPUT_EXTENSION: &str = "vm";

struct Args {
    path: PathBuf,
    verbose: bool,
    do_result: DoResultPolicy,
}

fn main() -> anyhow::Result<()> {
    let args = match parse_args(env::args().skip(1)) {
        Some(args) => args,
        None => {
            println!("{USAGE}");
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    };

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .env()
        .init()?;

    let options = CompilerOptions::default().with_do_result(args.do_result);
    let units = collect_units(&args.path)?;
    if units.is_empty() {
        warn!("no .{SOURCE_EXTENSION} files in {}", args.path.display());
    }

    compile_units(&units, &options)
}

// Every unit gets its own session; one bad unit doesn't stop the rest.
fn compile_units(units: &[PathBuf], options: &CompilerOptions) -> anyhow::Result<()> {
    let mut failed = 0;
    for unit in units {
        match compile_unit(unit, options) {
            Ok(output) => info!("{} -> {}", unit.display(), output.display()),
            Err(err) => {
                error!("{err:#}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} units failed to compile", units.len());
    }
    Ok(())
}

fn parse_args(args: impl Iterator<Item = String>) -> Option<Args> {
    let mut path = None;
    let mut verbose = false;
    let mut do_result = DoResultPolicy::Discard;
    for arg in args {
        match arg.as_str() {
            "-v" => verbose = true,
            "--keep-do-result" => do_result = DoResultPolicy::Convention,
            flag if flag.starts_with('-') => return None,
            _ if path.is_some() => return None,
            _ => path = Some(PathBuf::from(arg)),
        }
    }
    Some(Args {
        path: path?,
        verbose,
        do_result,
    })
}

fn is_source(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == SOURCE_EXTENSION)
}

fn collect_units(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !path.is_dir() {
        if !is_source(path) {
            bail!("{} is not a .{SOURCE_EXTENSION} file", path.display());
        }
        return Ok(vec![path.to_owned()]);
    }

    let mut units = Vec::new();
    let entries =
        fs::read_dir(path).with_context(|| format!("reading directory {}", path.display()))?;
    for entry in entries {
        let entry_path = entry?.path();
        if entry_path.is_file() && is_source(&entry_path) {
            units.push(entry_path);
        }
    }
    units.sort();
    Ok(units)
}

// Output is written only once the whole class has compiled.
fn compile_unit(source_path: &Path, options: &CompilerOptions) -> anyhow::Result<PathBuf> {
    let source = fs::read_to_string(source_path)
        .with_context(|| format!("reading {}", source_path.display()))?;
    let compiled = compile(&source, options)
        .with_context(|| format!("compiling {}", source_path.display()))?;

    if let Some(stem) = source_path.file_stem().and_then(|s| s.to_str()) {
        if stem != compiled.name() {
            warn!(
                "{} declares class {}, which does not match the file name",
                source_path.display(),
                compiled.name()
            );
        }
    }

    let output_path = source_path.with_extension(OUTPUT_EXTENSION);
    let file = File::create(&output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;
    let mut out = BufWriter::new(file);
    compiled.write_to(&mut out)?;
    out.flush()?;
    Ok(output_path)
}

#[cfg(test)]
mod test {
    use super::*;

    const GOOD: &str = "class Good { function int f() { return 1; } }";
    const BAD: &str = "class Bad { function void f() { let = 1; } }";

    // A fresh directory under the system temp dir, removed when dropped.
    struct Scratch(PathBuf);

    impl Scratch {
        fn new(name: &str) -> Self {
            let dir = env::temp_dir().join(format!("jackc_{}_{}", name, std::process::id()));
            fs::remove_dir_all(&dir).ok();
            fs::create_dir_all(&dir).unwrap();
            Scratch(dir)
        }

        fn write(&self, name: &str, contents: &str) -> PathBuf {
            let path = self.0.join(name);
            fs::write(&path, contents).unwrap();
            path
        }
    }

    impl Drop for Scratch {
        fn drop(&mut self) {
            fs::remove_dir_all(&self.0).ok();
        }
    }

    fn args(list: &[&str]) -> Option<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn usage_errors() {
        assert!(args(&[]).is_none());
        assert!(args(&["-v"]).is_none());
        assert!(args(&["--bogus", "Main.jack"]).is_none());
        assert!(args(&["A.jack", "B.jack"]).is_none());

        let parsed = args(&["--keep-do-result", "-v", "src"]).unwrap();
        assert_eq!(parsed.path, PathBuf::from("src"));
        assert!(parsed.verbose);
        assert_eq!(parsed.do_result, DoResultPolicy::Convention);

        let parsed = args(&["Main.jack"]).unwrap();
        assert!(!parsed.verbose);
        assert_eq!(parsed.do_result, DoResultPolicy::Discard);
    }

    #[test]
    fn units_are_sorted_and_not_recursive() {
        let scratch = Scratch::new("collect");
        scratch.write("Zeta.jack", GOOD);
        scratch.write("Alpha.jack", GOOD);
        scratch.write("notes.txt", "not jack");
        scratch.write("Main.vm", "return");
        fs::create_dir_all(scratch.0.join("nested")).unwrap();
        scratch.write("nested/Inner.jack", GOOD);

        let units = collect_units(&scratch.0).unwrap();
        assert_eq!(
            units,
            vec![scratch.0.join("Alpha.jack"), scratch.0.join("Zeta.jack")]
        );

        let single = collect_units(&scratch.0.join("Zeta.jack")).unwrap();
        assert_eq!(single, vec![scratch.0.join("Zeta.jack")]);
        assert!(collect_units(&scratch.0.join("notes.txt")).is_err());
    }

    #[test]
    fn output_sits_next_to_the_source() {
        let scratch = Scratch::new("output");
        let source = scratch.write("Good.jack", GOOD);

        let output = compile_unit(&source, &CompilerOptions::default()).unwrap();
        assert_eq!(output, scratch.0.join("Good.vm"));
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "function Good.f 0\npush constant 1\nreturn\n"
        );
    }

    #[test]
    fn a_bad_unit_writes_nothing_and_fails_the_batch() {
        let scratch = Scratch::new("batch");
        let bad = scratch.write("Bad.jack", BAD);
        let good = scratch.write("Good.jack", GOOD);

        assert!(compile_unit(&bad, &CompilerOptions::default()).is_err());
        assert!(!scratch.0.join("Bad.vm").exists());

        let units = vec![bad, good];
        let err = compile_units(&units, &CompilerOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "1 of 2 units failed to compile");
        assert!(scratch.0.join("Good.vm").exists());
        assert!(!scratch.0.join("Bad.vm").exists());
    }
}
