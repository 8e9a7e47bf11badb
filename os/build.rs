use std::env;

fn main() {
    println!("cargo:rerun-if-changed=src/linker.ld");
    println!("cargo:rerun-if-changed=build.rs");

    // 只有裸机目标需要内核链接脚本
    if env::var("CARGO_CFG_TARGET_ARCH").as_deref() == Ok("riscv64") {
        let dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into());
        println!("cargo:rustc-link-arg=-T{}/src/linker.ld", dir);
    }
}
