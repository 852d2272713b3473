//! Code regarding file input (reading source `.jack` files)
//! and output (writing generated artifacts) actions.
//!
//! ## Input
//! `jackc` is given either a single `.jack` file or a directory,
//! which is searched recursively for `.jack` files.
//!
//! Each file becomes one compilation unit, named after its path relative
//! to the input directory: every component is converted to `UpperCamelCase`
//! and the components are joined with `_` (so `src/game/ball.jack` in
//! directory `src` becomes `Game_Ball`).
//!
//! ## Output
//! Artifacts are written to a single output directory (by default `bin`,
//! inside the input directory). Since `Hack` only loads `.vm` files from
//! a single directory, nested sources are "flattened" there.

use std::{
    io,
    path::{Path, PathBuf},
};

const SOURCE_EXTENSION: &str = "jack";
const DEFAULT_OUTPUT_DIR: &str = "bin";

/// Directory holding the sources of the given input path.
fn root_dir(input_path: &Path) -> io::Result<PathBuf> {
    if input_path.is_dir() {
        Ok(input_path.to_path_buf())
    } else if input_path.is_file() && has_source_extension(input_path) {
        Ok(input_path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf))
    } else {
        Err(io::Error::other(
            "provided path is neither a directory nor a `.jack` file",
        ))
    }
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension == SOURCE_EXTENSION)
}

/// Output directory used when none was requested explicitly.
pub fn default_output_dir(input_path: &Path) -> io::Result<PathBuf> {
    Ok(root_dir(input_path)?.join(DEFAULT_OUTPUT_DIR))
}

pub mod input {
    use std::{
        fs, io,
        path::{Path, PathBuf},
    };

    use heck::ToUpperCamelCase;

    use crate::compiler::CompilationUnit;

    #[derive(Debug)]
    pub struct SourceFile {
        pub path: PathBuf,
        pub unit: CompilationUnit,
    }

    /// Load every source file reachable from the input path, ordered by path.
    pub fn discover(input_path: &Path) -> io::Result<Vec<SourceFile>> {
        let root = super::root_dir(input_path)?;

        let mut paths = if input_path.is_dir() {
            let mut paths = Vec::new();
            collect_sources(&root, &mut paths)?;
            paths
        } else {
            vec![input_path.to_path_buf()]
        };
        paths.sort();

        paths
            .into_iter()
            .map(|path| {
                let name = unit_name(&root, &path).ok_or_else(|| {
                    io::Error::other(format!("cannot name the unit at `{}`", path.display()))
                })?;
                let lines = fs::read_to_string(&path)?
                    .lines()
                    .map(String::from)
                    .collect();

                log::debug!("loaded `{}` as unit `{name}`", path.display());

                Ok(SourceFile {
                    path,
                    unit: CompilationUnit { name, lines },
                })
            })
            .collect()
    }

    fn collect_sources(dir: &Path, paths: &mut Vec<PathBuf>) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();

            if path.is_dir() {
                // skip the generated artifacts of earlier runs
                if path.file_name().is_some_and(|name| name == super::DEFAULT_OUTPUT_DIR) {
                    continue;
                }
                collect_sources(&path, paths)?;
            } else if super::has_source_extension(&path) {
                paths.push(path);
            }
        }

        Ok(())
    }

    /// Path components below `root`, converted to `UpperCamelCase`
    /// and joined with `_`; the file extension is dropped.
    pub fn unit_name(root: &Path, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(root).ok()?.with_extension("");

        let components = relative
            .components()
            .map(|component| {
                component
                    .as_os_str()
                    .to_str()
                    .map(|name| name.to_upper_camel_case())
            })
            .collect::<Option<Vec<_>>>()?;

        (!components.is_empty()).then(|| components.join("_"))
    }
}

pub mod output {
    use std::{
        fs,
        io::{self, Write},
        path::{Path, PathBuf},
    };

    /// Kind of a generated file, serialized as its extension.
    #[derive(Debug, PartialEq, Eq, Clone, Copy, strum::Display)]
    #[strum(serialize_all = "lowercase")]
    pub enum ArtifactKind {
        /// Hack VM instructions of a class.
        Vm,
        /// Structural description of a class.
        Desc,
        /// Trace of a unit that failed to parse.
        Syntax,
        /// Combined report of all semantic errors.
        Err,
        /// Parse tree of the whole program.
        Xml,
    }

    #[derive(Debug, PartialEq, Eq)]
    pub struct OutputFile {
        pub name: String,
        pub kind: ArtifactKind,
        pub content: String,
    }

    impl OutputFile {
        pub const fn new(name: String, kind: ArtifactKind, content: String) -> Self {
            Self {
                name,
                kind,
                content,
            }
        }

        pub fn file_name(&self) -> String {
            format!("{}.{}", self.name, self.kind)
        }
    }

    pub struct OutputGenerator {
        out_path: PathBuf,
    }

    impl OutputGenerator {
        /// Make sure the output directory exists.
        pub fn setup(out_path: &Path) -> io::Result<Self> {
            if !out_path.is_dir() {
                fs::create_dir_all(out_path)?;
            }

            Ok(Self {
                out_path: out_path.to_path_buf(),
            })
        }

        pub fn generate(&self, output_file: &OutputFile) -> io::Result<()> {
            let file_path = self.out_path.join(output_file.file_name());

            log::debug!("writing `{}`", file_path.display());

            fs::File::create(file_path)?.write_all(output_file.content.as_bytes())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use super::{input, output};

    #[test]
    fn test_unit_names() {
        let root = Path::new("/project/src");

        assert_eq!(
            input::unit_name(root, Path::new("/project/src/Main.jack")),
            Some(String::from("Main"))
        );
        assert_eq!(
            input::unit_name(root, Path::new("/project/src/game/ball_shape.jack")),
            Some(String::from("Game_BallShape"))
        );
        assert_eq!(
            input::unit_name(root, Path::new("/elsewhere/Main.jack")),
            None
        );
    }

    #[test]
    fn test_artifact_file_names() {
        let file = |kind| output::OutputFile::new(String::from("Main"), kind, String::new());

        assert_eq!(file(output::ArtifactKind::Vm).file_name(), "Main.vm");
        assert_eq!(file(output::ArtifactKind::Desc).file_name(), "Main.desc");
        assert_eq!(file(output::ArtifactKind::Syntax).file_name(), "Main.syntax");
    }

    #[test]
    fn test_discover_and_generate() {
        let root = std::env::temp_dir().join(format!("jackc-fileio-{}", std::process::id()));
        let nested = root.join("shapes");
        fs::create_dir_all(&nested).expect("temp dir should be writable");
        fs::write(root.join("Main.jack"), "class Main {\n}\n").expect("should write");
        fs::write(nested.join("square.jack"), "class Square {}").expect("should write");
        fs::write(root.join("notes.txt"), "ignored").expect("should write");

        let sources = input::discover(&root).expect("sources should load");
        let names = sources
            .iter()
            .map(|source| source.unit.name.as_str())
            .collect::<Vec<_>>();

        assert_eq!(names, ["Main", "Shapes_Square"]);
        assert_eq!(sources[0].unit.lines, ["class Main {", "}"]);

        let out_path = super::default_output_dir(&root).expect("root should be valid");
        let generator = output::OutputGenerator::setup(&out_path).expect("should create bin");
        generator
            .generate(&output::OutputFile::new(
                String::from("Main"),
                output::ArtifactKind::Vm,
                String::from("return"),
            ))
            .expect("should write artifact");

        assert_eq!(
            fs::read_to_string(out_path.join("Main.vm")).expect("artifact should exist"),
            "return"
        );

        fs::remove_dir_all(&root).expect("should clean up");
    }
}
