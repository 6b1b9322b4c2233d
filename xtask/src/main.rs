//! Build automation for riff
//!
//! Usage: cargo xtask <command>
//!
//! Available commands:
//! - build: Build the project
//! - test: Run tests
//! - dist: Create distribution packages
//! - install: Install to system
//! - docs: Generate command reference pages
//! - ci: Run CI checks

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use xshell::{cmd, Shell};

const BINARY: &str = "riff";

/// Nouns and the verbs each of them supports.
const COMMANDS: &[(&str, &[&str])] = &[
    ("application", &["create", "list", "delete", "status", "tail"]),
    ("completion", &[]),
    ("credential", &["apply", "list", "delete"]),
    ("doctor", &[]),
    ("function", &["create", "list", "delete", "status", "tail"]),
    ("handler", &["create", "list", "delete", "status", "tail", "invoke"]),
    ("processor", &["create", "list", "delete", "status", "tail"]),
    ("requestprocessor", &["create", "list", "delete", "status", "invoke"]),
    ("route", &["create", "list", "delete", "status", "invoke"]),
    ("stream", &["create", "list", "delete", "status"]),
];

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for riff")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the project
    Build {
        /// Build in release mode
        #[arg(long)]
        release: bool,
    },
    /// Run tests
    Test {
        /// Run only integration tests
        #[arg(long)]
        integration: bool,
    },
    /// Create distribution packages
    Dist {
        /// Target triple (e.g., x86_64-unknown-linux-gnu)
        #[arg(long)]
        target: Option<String>,
    },
    /// Install to system
    Install {
        /// Installation prefix (default: /usr/local)
        #[arg(long, default_value = "/usr/local")]
        prefix: String,
    },
    /// Generate markdown command reference into docs/
    Docs,
    /// Run CI checks (format, clippy, test)
    Ci,
    /// Format code
    Format {
        /// Check formatting without modifying files
        #[arg(long)]
        check: bool,
    },
    /// Run clippy
    Clippy,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    sh.change_dir(project_root()?);

    match cli.command {
        Commands::Build { release } => build(&sh, release),
        Commands::Test { integration } => test(&sh, integration),
        Commands::Dist { target } => dist(&sh, target),
        Commands::Install { prefix } => install(&sh, &prefix),
        Commands::Docs => docs(&sh),
        Commands::Ci => ci(&sh),
        Commands::Format { check } => format(&sh, check),
        Commands::Clippy => clippy(&sh),
    }
}

fn build(sh: &Shell, release: bool) -> Result<()> {
    println!("🔨 Building {}...", BINARY);

    if release {
        cmd!(sh, "cargo build --release").run()?;
        println!("✅ Release build completed: target/release/{}", BINARY);
    } else {
        cmd!(sh, "cargo build").run()?;
        println!("✅ Debug build completed: target/debug/{}", BINARY);
    }

    Ok(())
}

fn test(sh: &Shell, integration: bool) -> Result<()> {
    println!("🧪 Running tests...");

    if integration {
        cmd!(sh, "cargo test --test '*'").run()?;
    } else {
        cmd!(sh, "cargo test --all").run()?;
    }

    println!("✅ All tests passed");
    Ok(())
}

fn dist(sh: &Shell, target: Option<String>) -> Result<()> {
    println!("📦 Creating distribution package...");

    if let Some(ref target_triple) = target {
        cmd!(sh, "cargo build --release --target {target_triple}").run()?;
    } else {
        cmd!(sh, "cargo build --release").run()?;
    }

    let root = project_root()?;
    let dist_dir = root.join("dist");
    sh.create_dir(&dist_dir)?;

    let binary_src = match target {
        Some(ref target_triple) => root.join(format!("target/{}/release/{}", target_triple, BINARY)),
        None => root.join(format!("target/release/{}", BINARY)),
    };
    sh.copy_file(&binary_src, dist_dir.join(BINARY))?;

    let version = env!("CARGO_PKG_VERSION");
    let archive_name = format!("{}-{}.tar.gz", BINARY, version);

    cmd!(sh, "tar -czf {archive_name} -C dist {BINARY}")
        .run()
        .context("Failed to create tarball")?;

    println!("✅ Distribution package created: {}", archive_name);
    Ok(())
}

fn install(sh: &Shell, prefix: &str) -> Result<()> {
    println!("📥 Installing {} to {}...", BINARY, prefix);

    let binary = project_root()?.join(format!("target/release/{}", BINARY));
    if !binary.exists() {
        println!("Building release binary first...");
        cmd!(sh, "cargo build --release").run()?;
    }

    let bin_dir = Path::new(prefix).join("bin");
    sh.create_dir(&bin_dir)?;

    let install_path = bin_dir.join(BINARY);
    sh.copy_file(&binary, &install_path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&install_path, std::fs::Permissions::from_mode(0o755))?;
    }

    println!("✅ Installed to: {}", install_path.display());
    Ok(())
}

/// One page per noun, with the help text of the noun and each of its verbs.
fn docs(sh: &Shell) -> Result<()> {
    println!("📚 Generating command reference...");

    cmd!(sh, "cargo build --quiet").run()?;
    let binary = project_root()?.join(format!("target/debug/{}", BINARY));
    let docs_dir = project_root()?.join("docs");
    sh.create_dir(&docs_dir)?;

    let mut index = format!("# {}\n\n", BINARY);
    for (noun, verbs) in COMMANDS {
        let mut page = format!("# {} {}\n\n", BINARY, noun);
        let help = cmd!(sh, "{binary} {noun} --help").read()?;
        page.push_str(&format!("```\n{}\n```\n", help));
        for verb in verbs.iter() {
            let help = cmd!(sh, "{binary} {noun} {verb} --help")
                .read()
                .with_context(|| format!("unable to read help for {} {}", noun, verb))?;
            page.push_str(&format!("\n## {} {} {}\n\n```\n{}\n```\n", BINARY, noun, verb, help));
        }

        let file = format!("{}_{}.md", BINARY, noun);
        sh.write_file(docs_dir.join(&file), page)?;
        index.push_str(&format!("- [{} {}]({})\n", BINARY, noun, file));
    }
    sh.write_file(docs_dir.join(format!("{}.md", BINARY)), index)?;

    println!("✅ Reference written to {}", docs_dir.display());
    Ok(())
}

fn ci(sh: &Shell) -> Result<()> {
    println!("🔍 Running CI checks...");

    println!("\n📝 Checking formatting...");
    format(sh, true)?;

    println!("\n🔧 Running clippy...");
    clippy(sh)?;

    println!("\n🧪 Running tests...");
    test(sh, false)?;

    println!("\n✅ All CI checks passed!");
    Ok(())
}

fn format(sh: &Shell, check: bool) -> Result<()> {
    if check {
        cmd!(sh, "cargo fmt --all -- --check").run()?;
        println!("✅ Code formatting is correct");
    } else {
        cmd!(sh, "cargo fmt --all").run()?;
        println!("✅ Code formatted");
    }
    Ok(())
}

fn clippy(sh: &Shell) -> Result<()> {
    cmd!(
        sh,
        "cargo clippy --all-targets --all-features -- -D warnings"
    )
    .run()?;
    println!("✅ Clippy checks passed");
    Ok(())
}

fn project_root() -> Result<PathBuf> {
    Path::new(&env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(1)
        .map(Path::to_path_buf)
        .context("xtask is not inside the workspace")
}
