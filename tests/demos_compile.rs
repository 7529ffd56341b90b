//! Every demo program under demos/ translates in strict mode.

use std::fs;
use std::path::Path;

use simplec::{compile, Options};

fn compile_file(path: &Path) -> Result<String, String> {
    let source = fs::read_to_string(path).map_err(|e| format!("Failed to read file: {}", e))?;
    compile(&source, &Options::default()).map_err(|e| format!("Translation failed: {}", e))
}

macro_rules! demo_test {
    ($name:ident, $file:expr) => {
        #[test]
        fn $name() {
            let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join($file);
            match compile_file(&path) {
                Ok(go) => assert!(go.contains("func main() {"), "{} produced no main", $file),
                Err(e) => panic!("Failed to compile {}: {}", $file, e),
            }
        }
    };
}

demo_test!(test_hello, "hello.simple");
demo_test!(test_counter, "counter.simple");
demo_test!(test_conditions, "conditions.simple");
demo_test!(test_collections, "collections.simple");
demo_test!(test_functions, "functions.simple");
demo_test!(test_io, "io.simple");
demo_test!(test_ask, "ask.simple");

#[test]
fn test_all_demos_compile() {
    let demos_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");

    let mut failures = Vec::new();
    let mut seen = 0;

    for entry in fs::read_dir(&demos_dir).expect("Failed to read demos directory") {
        let path = entry.expect("Failed to read directory entry").path();
        if path.extension().map(|e| e == "simple").unwrap_or(false) {
            seen += 1;
            if let Err(e) = compile_file(&path) {
                failures.push(format!("{}: {}", path.display(), e));
            }
        }
    }

    assert!(seen > 0, "no demos found in {}", demos_dir.display());
    if !failures.is_empty() {
        panic!("Failed to compile {} demo(s):\n{}", failures.len(), failures.join("\n"));
    }
}
