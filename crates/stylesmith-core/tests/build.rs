//! End-to-end builds against a temporary project tree.

use std::path::{Path, PathBuf};

use stylesmith_core::{BuildConfig, Builder, ThemeError};
use tempfile::{tempdir, TempDir};

/// `<tmp>/src` is the project root, output goes to `<tmp>/dist`.
struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        let project = Self { dir: tempdir().unwrap() };
        project.write("themes/shared/_vars.scss", "$radius: 4px;\n");
        project.write("themes/shared/_reset.scss", "* { box-sizing: border-box; }\n");
        project.write(
            "components/Header/Header.scss",
            ".header { color: $fg; border-radius: $radius; }\n",
        );
        project.write(
            "components/Content/Content.scss",
            ".content { background: $bg; }\n",
        );
        project.write("components/Content/Content.js", "export default null;\n");
        project
    }

    fn root(&self) -> PathBuf {
        self.dir.path().join("src")
    }

    fn dist(&self) -> PathBuf {
        self.dir.path().join("dist")
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.root().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn theme(&self, name: &str, fg: &str, bg: &str) {
        self.write(
            &format!("themes/{name}.theme.scss"),
            &format!("$fg: {fg};\n$bg: {bg};\n"),
        );
    }

    fn builder(&self) -> Builder {
        let layout = BuildConfig::default().resolve(self.root()).unwrap();
        Builder::with_grass(layout)
    }

    fn listing(&self, sub: &str) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dist().join(sub))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

fn read(path: impl AsRef<Path>) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[tokio::test]
async fn builds_one_stylesheet_per_theme() {
    let project = Project::new();
    project.theme("light", "#111", "#fff");
    project.theme("dark", "#eee", "#000");
    project.theme("contrast", "#000", "#ff0");

    let report = project.builder().compile().await;

    assert!(report.is_success(), "{report:?}");
    let themes: Vec<&str> = report.themes.iter().map(|t| t.theme.as_str()).collect();
    assert_eq!(themes, ["contrast", "dark", "light"]);

    assert_eq!(
        project.listing("scss"),
        ["my-lib.contrast.scss", "my-lib.dark.scss", "my-lib.light.scss"]
    );
    assert_eq!(
        project.listing("css"),
        [
            "my-lib.contrast.css",
            "my-lib.contrast.css.map",
            "my-lib.dark.css",
            "my-lib.dark.css.map",
            "my-lib.light.css",
            "my-lib.light.css.map",
        ]
    );

    let dark = read(project.dist().join("css/my-lib.dark.css"));
    assert!(dark.contains("#eee"));
    assert!(dark.contains("border-radius: 4px"));
}

#[tokio::test]
async fn aggregate_imports_follow_cascade_order() {
    let project = Project::new();
    project.theme("light", "#111", "#fff");

    project.builder().compile().await;

    let aggregate = read(project.dist().join("scss/my-lib.light.scss"));
    assert_eq!(
        aggregate,
        "@import '../../src/themes/shared/_reset.scss';\n\
         @import '../../src/themes/shared/_vars.scss';\n\
         @import '../../src/themes/light.theme.scss';\n\
         @import '../../src/components/Content/Content.scss';\n\
         @import '../../src/components/Header/Header.scss';\n"
    );
}

#[tokio::test]
async fn repeated_builds_are_identical() {
    let project = Project::new();
    project.theme("light", "#111", "#fff");
    project.theme("dark", "#eee", "#000");
    let builder = project.builder();

    builder.compile().await;
    let first = (
        read(project.dist().join("css/my-lib.light.css")),
        read(project.dist().join("css/my-lib.dark.css.map")),
    );

    builder.compile().await;
    let second = (
        read(project.dist().join("css/my-lib.light.css")),
        read(project.dist().join("css/my-lib.dark.css.map")),
    );

    assert_eq!(first, second);
}

#[tokio::test]
async fn syntax_error_is_isolated_to_its_theme() {
    let project = Project::new();
    project.theme("light", "#111", "#fff");
    project.write("themes/broken.theme.scss", "$fg: #000;\n$bg: #fff;\n.oops {\n");

    let report = project.builder().compile().await;

    assert!(!report.is_success());
    let failed: Vec<&str> = report.failed().map(|t| t.theme.as_str()).collect();
    assert_eq!(failed, ["broken"]);
    assert!(matches!(
        report.failed().next().unwrap().result,
        Err(ThemeError::Compile(_))
    ));

    assert!(project.dist().join("scss/my-lib.broken.scss").is_file());
    assert!(!project.dist().join("css/my-lib.broken.css").exists());
    assert!(project.dist().join("css/my-lib.light.css").is_file());
}

#[tokio::test]
async fn stale_outputs_are_removed() {
    let project = Project::new();
    project.theme("light", "#111", "#fff");
    project.theme("dark", "#eee", "#000");
    let builder = project.builder();

    builder.compile().await;
    std::fs::remove_file(project.root().join("themes/dark.theme.scss")).unwrap();
    builder.compile().await;

    assert_eq!(project.listing("scss"), ["my-lib.light.scss"]);
}

#[tokio::test]
async fn missing_components_dir_still_builds_themes() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("themes")).unwrap();
    std::fs::write(root.join("themes/plain.theme.scss"), "p { margin: 0; }\n").unwrap();

    let mut config = BuildConfig::default();
    config.paths.dist = PathBuf::from("out");
    config.output.source_map = false;
    let report = Builder::with_grass(config.resolve(root).unwrap())
        .compile()
        .await;

    assert!(report.is_success());
    let css = read(root.join("out/css/my-lib.plain.css"));
    assert!(css.contains("margin: 0"));
    assert!(!css.contains("sourceMappingURL"));
    assert!(!root.join("out/css/my-lib.plain.css.map").exists());
}
