//! Solution generator - creates a new solution directory
//!
//! Generates:
//! - `<problem>.cpp` reading `<problem>.in` and writing `<problem>.out`
//! - `Makefile` with `compile`, `test` and `clean` targets
//! - an empty `test/` directory for fixtures

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use infoarena_core::{DEFAULT_TEST_DIR, INPUT_SUFFIX, OUTPUT_SUFFIX};

use crate::config::validate_single_component;
use crate::version::INFOARENA_VERSION;

/// Name of the binary the generated `test` target invokes
pub const BIN_NAME: &str = "infoarena";

/// Extension of the generated source stub
pub const SOURCE_EXTENSION: &str = "cpp";

/// What `generate` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    Created,
    /// A file or directory with the problem's name already exists; nothing was written.
    AlreadyExists,
}

/// Generator for new solution skeletons
pub struct SolutionGenerator {
    /// Directory the solution directory is created in
    parent_dir: PathBuf,
    /// Problem identifier; names the directory, the source file and the executable
    problem: String,
}

impl SolutionGenerator {
    pub fn new(parent_dir: impl AsRef<Path>, problem: &str) -> Self {
        Self {
            parent_dir: parent_dir.as_ref().to_path_buf(),
            problem: problem.to_string(),
        }
    }

    pub fn solution_dir(&self) -> PathBuf {
        self.parent_dir.join(&self.problem)
    }

    /// Create the solution directory, unless something with that name already exists.
    pub fn generate(&self) -> io::Result<GenerateOutcome> {
        let solution_dir = self.solution_dir();
        if solution_dir.exists() {
            return Ok(GenerateOutcome::AlreadyExists);
        }

        fs::create_dir(&solution_dir)?;
        fs::write(
            solution_dir.join(format!("{}.{}", self.problem, SOURCE_EXTENSION)),
            self.generate_source(),
        )?;
        fs::write(solution_dir.join("Makefile"), self.generate_makefile())?;
        fs::create_dir(solution_dir.join(DEFAULT_TEST_DIR))?;

        Ok(GenerateOutcome::Created)
    }

    /// Generate the C++ source stub
    pub fn generate_source(&self) -> String {
        format!(
            r#"#include <fstream>
using namespace std;

int main() {{
    ifstream fin("{problem}{input}");
    ofstream fout("{problem}{output}");


    fin.close();
    fout.close();
}}
"#,
            problem = self.problem,
            input = INPUT_SUFFIX,
            output = OUTPUT_SUFFIX,
        )
    }

    /// Generate Makefile content
    pub fn generate_makefile(&self) -> String {
        format!(
            "# Generated by {bin} {version}\n\
             compile: {problem}.{ext}\n\
             \tg++ -g -Wall -O2 {problem}.{ext} -lm -o {problem}\n\
             \n\
             test: compile\n\
             \t@{bin} test\n\
             \n\
             clean:\n\
             \t@rm -f {problem}\n\
             \t@rm -f {test_dir}/{problem}\n\
             \t@rm -f *~ *.o\n",
            bin = BIN_NAME,
            version = INFOARENA_VERSION,
            problem = self.problem,
            ext = SOURCE_EXTENSION,
            test_dir = DEFAULT_TEST_DIR,
        )
    }
}

/// Validate a problem identifier before it is used as a directory name.
///
/// Rejects empty names, `.`/`..`, and names containing path separators, so `create` never writes outside the
/// current directory.
pub fn validate_problem_name(problem: &str) -> Result<(), String> {
    validate_single_component(problem).map_err(|reason| format!("solution name '{}' {}", problem, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_makefile_targets() {
        let makefile = SolutionGenerator::new("/tmp", "sum").generate_makefile();
        assert!(makefile.contains("compile: sum.cpp\n\tg++ -g -Wall -O2 sum.cpp -lm -o sum\n"));
        assert!(makefile.contains("test: compile\n\t@infoarena test\n"));
        assert!(makefile.contains("\t@rm -f test/sum\n"));
    }

    #[test]
    fn test_source_uses_problem_files() {
        let source = SolutionGenerator::new("/tmp", "sum").generate_source();
        assert!(source.contains(r#"ifstream fin("sum.in");"#));
        assert!(source.contains(r#"ofstream fout("sum.out");"#));
    }

    #[test]
    fn test_generate_creates_skeleton() {
        let temp = TempDir::new().unwrap();
        let generator = SolutionGenerator::new(temp.path(), "sum");

        assert_eq!(generator.generate().unwrap(), GenerateOutcome::Created);

        let dir = temp.path().join("sum");
        assert!(dir.join("sum.cpp").is_file());
        assert!(dir.join("Makefile").is_file());
        assert!(dir.join("test").is_dir());
        assert_eq!(fs::read_dir(dir.join("test")).unwrap().count(), 0);
    }

    #[test]
    fn test_generate_leaves_existing_solution_alone() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("sum");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("sum.cpp"), "// mine").unwrap();

        let outcome = SolutionGenerator::new(temp.path(), "sum").generate().unwrap();

        assert_eq!(outcome, GenerateOutcome::AlreadyExists);
        assert_eq!(fs::read_to_string(dir.join("sum.cpp")).unwrap(), "// mine");
        assert!(!dir.join("Makefile").exists());
    }

    #[test]
    fn test_validate_problem_name() {
        assert!(validate_problem_name("sum").is_ok());
        assert!(validate_problem_name("a-b_c.1").is_ok());
        assert!(validate_problem_name("").is_err());
        assert!(validate_problem_name("..").is_err());
        assert!(validate_problem_name("a/b").is_err());
        assert!(validate_problem_name("a\\b").is_err());
    }
}
