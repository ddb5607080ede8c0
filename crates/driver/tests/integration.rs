//! Driver scenarios against an instrumented fake library

use std::cell::RefCell;
use std::io::Read;
use std::path::Path;

use pacshim_driver::{install_archive, InitOutcome, PackageLibrary};
use pacshim_interpose::PrivilegedOps;

/// Fake package library recording every call and releasing points.
struct FakeLibrary<'a> {
    fail_init: bool,
    partial_on_failed_init: bool,
    fail_load: bool,
    fail_commit: bool,
    calls: RefCell<Vec<String>>,
    hooks: Option<&'a dyn PrivilegedOps>,
}

impl FakeLibrary<'_> {
    fn new() -> Self {
        Self {
            fail_init: false,
            partial_on_failed_init: false,
            fail_load: false,
            fail_commit: false,
            calls: RefCell::new(Vec::new()),
            hooks: None,
        }
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    fn count(&self, call: &str) -> usize {
        self.calls.borrow().iter().filter(|c| *c == call).count()
    }

    fn position(&self, call: &str) -> Option<usize> {
        self.calls.borrow().iter().position(|c| c == call)
    }
}

impl PackageLibrary for FakeLibrary<'_> {
    type Handle = u32;
    type Package = String;

    fn initialize(&self, _root: &Path, _db_path: &Path) -> InitOutcome<u32> {
        self.record("initialize");
        if self.fail_init {
            InitOutcome::Failed {
                partial: self.partial_on_failed_init.then_some(7),
                message: "could not create database directory".to_string(),
            }
        } else {
            InitOutcome::Ready(7)
        }
    }

    fn last_error(&self, _handle: &u32) -> String {
        if self.fail_load {
            "could not open package file".to_string()
        } else {
            "transaction aborted".to_string()
        }
    }

    fn trans_init(&self, _handle: &mut u32) -> i32 {
        self.record("trans_init");
        0
    }

    fn load_package(&self, _handle: &mut u32, archive: &Path) -> Option<String> {
        self.record(format!("load_package {}", archive.display()));
        if self.fail_load {
            None
        } else {
            Some(archive.display().to_string())
        }
    }

    fn add_package(&self, _handle: &mut u32, package: String) -> i32 {
        self.record(format!("add_package {package}"));
        0
    }

    fn trans_prepare(&self, _handle: &mut u32) -> i32 {
        self.record("trans_prepare");
        0
    }

    fn trans_commit(&self, _handle: &mut u32) -> i32 {
        self.record("trans_commit");
        if let Some(hooks) = self.hooks {
            // the library runs each hook script through the
            // interposed entry points during commit
            assert_eq!(hooks.chroot(Path::new("/install/root")), 0);
            let mut body: &[u8] = b"post_install\n";
            let rc =
                hooks.run_privileged_command("/bin/sh", &["-c".to_string()], Some(&mut body));
            let rc_no_stdin = hooks.run_privileged_command("/usr/bin/ldconfig", &[], None);
            if rc != 0 || rc_no_stdin != 0 {
                return -1;
            }
        }
        if self.fail_commit {
            -1
        } else {
            0
        }
    }

    fn trans_release(&self, _handle: &mut u32) {
        self.record("trans_release");
    }

    fn release(&self, _handle: u32) {
        self.record("release");
    }
}

#[test]
fn test_successful_install_sequence_and_release_order() {
    let lib = FakeLibrary::new();

    install_archive(
        &lib,
        Path::new("/install"),
        Path::new("/install/var/lib/db"),
        Path::new("/products/zsh.pkg.tar.zst"),
    )
    .unwrap();

    assert_eq!(
        *lib.calls.borrow(),
        vec![
            "initialize",
            "trans_init",
            "load_package /products/zsh.pkg.tar.zst",
            "add_package /products/zsh.pkg.tar.zst",
            "trans_prepare",
            "trans_commit",
            "trans_release",
            "release",
        ]
    );
}

#[test]
fn test_corrupt_archive_fails_and_releases_everything() {
    let mut lib = FakeLibrary::new();
    lib.fail_load = true;

    let err = install_archive(
        &lib,
        Path::new("/install"),
        Path::new("/install/var/lib/db"),
        Path::new("/products/corrupt.pkg.tar.zst"),
    )
    .unwrap_err();

    assert!(err.to_string().contains("could not open package file"));

    // commit never reached, resources still released exactly once,
    // transaction strictly before handle
    assert_eq!(lib.count("trans_commit"), 0);
    assert_eq!(lib.count("trans_release"), 1);
    assert_eq!(lib.count("release"), 1);
    assert!(lib.position("trans_release").unwrap() < lib.position("release").unwrap());
}

#[test]
fn test_failed_initialize_releases_partial_handle() {
    let mut lib = FakeLibrary::new();
    lib.fail_init = true;
    lib.partial_on_failed_init = true;

    let err = install_archive(
        &lib,
        Path::new("/install"),
        Path::new("/install/var/lib/db"),
        Path::new("/products/zsh.pkg.tar.zst"),
    )
    .unwrap_err();

    assert!(err.to_string().contains("could not create database directory"));
    assert_eq!(lib.count("release"), 1);
    assert_eq!(lib.count("trans_release"), 0);
}

#[test]
fn test_commit_failure_carries_diagnostic() {
    let mut lib = FakeLibrary::new();
    lib.fail_commit = true;

    let err = install_archive(
        &lib,
        Path::new("/install"),
        Path::new("/install/var/lib/db"),
        Path::new("/products/zsh.pkg.tar.zst"),
    )
    .unwrap_err();

    assert!(err.to_string().contains("commit failed"));
    assert!(err.to_string().contains("transaction aborted"));
    assert_eq!(lib.count("trans_release"), 1);
    assert_eq!(lib.count("release"), 1);
}

/// Privileged-ops stand-in recording what the library asked for.
struct RecordingOps {
    invocations: std::sync::Mutex<Vec<(String, Vec<String>, Vec<u8>)>>,
}

impl PrivilegedOps for RecordingOps {
    fn chroot(&self, _new_root: &Path) -> i32 {
        0
    }

    fn run_privileged_command(
        &self,
        command: &str,
        args: &[String],
        stdin: Option<&mut dyn Read>,
    ) -> i32 {
        let mut body = Vec::new();
        if let Some(source) = stdin {
            source.read_to_end(&mut body).unwrap();
        }
        self.invocations
            .lock()
            .unwrap()
            .push((command.to_string(), args.to_vec(), body));
        0
    }
}

#[test]
fn test_commit_runs_hooks_through_interposition() {
    let ops = RecordingOps {
        invocations: std::sync::Mutex::new(Vec::new()),
    };
    let mut lib = FakeLibrary::new();
    lib.hooks = Some(&ops);

    install_archive(
        &lib,
        Path::new("/install"),
        Path::new("/install/var/lib/db"),
        Path::new("/products/zsh.pkg.tar.zst"),
    )
    .unwrap();

    let invocations = ops.invocations.lock().unwrap();
    assert_eq!(invocations.len(), 2);
    assert_eq!(invocations[0].0, "/bin/sh");
    assert_eq!(invocations[0].2, b"post_install\n");
    assert_eq!(invocations[1].0, "/usr/bin/ldconfig");
    assert_eq!(invocations[1].2, b"");
}
