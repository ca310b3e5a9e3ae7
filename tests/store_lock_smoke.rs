// Multi-process lock smoke test for store append serialization.
use std::process::{Command, Stdio};

use stocklet::api::Catalog;

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_stocklet");
    Command::new(exe)
}

#[test]
fn concurrent_add_is_serialized() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dir = temp.path().join("catalog");

    let workers = 8;
    let mut children = Vec::new();
    for i in 0..workers {
        let child = cmd()
            .args([
                "--dir",
                dir.to_str().unwrap(),
                "add",
                &format!("product-{i}"),
            ])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn");
        children.push(child);
    }

    for mut child in children {
        let status = child.wait().expect("wait");
        assert!(status.success());
    }

    let catalog = Catalog::open(&dir).expect("open");
    let products = catalog.list_products().expect("list");
    assert_eq!(products.len(), workers);

    let mut ids: Vec<&str> = products.iter().map(|product| product.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), workers);

    for product in &products {
        assert!(product.name.starts_with("product-"));
        assert_eq!(product.status, "active");
    }
}
