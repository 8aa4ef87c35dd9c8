use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const VALID_DEPLOY_TOML: &str = r#"
[aws]
region = "us-west-2"
keyid = "AKIDEXAMPLE"
secretkey = "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY"
bucketname = "example-site"
domainname = "example.com"
hostedzoneid = "Z0123456789ABC"

[build]
command = "hugo"
args = ["--minify"]
"#;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write_deploy_toml(&self, content: &str) -> PathBuf {
        self.write_file("deploy.toml", content)
    }

    #[allow(dead_code)]
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }
}
