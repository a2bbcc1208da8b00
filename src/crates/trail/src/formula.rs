//! The Homebrew formula shipped at the repository root.
//!
//! `trail.rb` is generated, not handwritten: `trail formula` renders it
//! from the crate metadata and `trail formula --check` fails the build
//! when the committed copy drifts.

/// File name of the formula at the repository root.
pub const FORMULA_FILE: &str = "trail.rb";

/// Fields of a formula for a head-only, source-built tool.
#[derive(Debug, Clone)]
pub struct Formula {
    pub class_name: String,
    pub desc: String,
    pub homepage: String,
    pub head_url: String,
    pub head_branch: String,
    pub version: String,
    /// Empty until a stable tarball exists to checksum.
    pub sha256: String,
    /// Empty until the project picks a license.
    pub license: String,
    pub build_deps: Vec<String>,
    /// Sub-path of the cargo package to install, relative to the repository root.
    pub cargo_path: String,
    /// Scripts installed verbatim into `bin`.
    pub scripts: Vec<String>,
}

impl Formula {
    /// The formula for this repository, with metadata taken from the
    /// package manifest.
    pub fn trail() -> Self {
        Formula {
            class_name: "Trail".to_string(),
            desc: env!("CARGO_PKG_DESCRIPTION").to_string(),
            homepage: env!("CARGO_PKG_HOMEPAGE").to_string(),
            head_url: env!("CARGO_PKG_REPOSITORY").to_string(),
            head_branch: "main".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            sha256: String::new(),
            license: String::new(),
            build_deps: vec!["rust".to_string()],
            cargo_path: "src/crates/trail".to_string(),
            scripts: vec![
                "src/bash/git-prior".to_string(),
                "src/bash/git-restack".to_string(),
            ],
        }
    }

    /// Render the Ruby source of the formula.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!(
            r#"class {} < Formula
  desc "{}"
  homepage "{}"
  head "{}", branch: "{}", using: :git
  version "{}"
  sha256 "{}"
  license "{}"
"#,
            self.class_name,
            self.desc,
            self.homepage,
            self.head_url,
            self.head_branch,
            self.version,
            self.sha256,
            self.license,
        );

        if !self.build_deps.is_empty() {
            out.push('\n');
            for dep in &self.build_deps {
                out.push_str(&format!("  depends_on \"{dep}\" => :build\n"));
            }
        }

        out.push_str("\n  def install\n");
        out.push_str(&format!(
            "    system \"cargo\", \"install\", *std_cargo_args(path: \"{}\")\n",
            self.cargo_path
        ));
        for script in &self.scripts {
            out.push_str(&format!("    bin.install \"{script}\"\n"));
        }
        out.push_str("  end\n");

        out.push_str("\n  test do\n");
        out.push_str("    # Placeholder: replace with a real check before shipping to a tap.\n");
        out.push_str("    system \"false\"\n");
        out.push_str("  end\nend\n");

        out
    }
}
