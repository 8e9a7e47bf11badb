//! klog 公共 API 的集成测试（宏、全局注册、log 门面桥接）

use std::sync::{Mutex, MutexGuard, Once, OnceLock};

use klog::{LogContextProvider, LogLevel, LogOutput, pr_debug, pr_err, pr_info, pr_warn};

static INIT: Once = Once::new();

static OUTPUT_BUF: OnceLock<Mutex<String>> = OnceLock::new();

/// 全局缓冲区被所有测试共享，逐个执行
static SERIAL: Mutex<()> = Mutex::new(());

struct TestOutput;

impl LogOutput for TestOutput {
    fn write_str(&self, s: &str) {
        let buf = OUTPUT_BUF.get_or_init(|| Mutex::new(String::new()));
        buf.lock().unwrap().push_str(s);
    }
}

static TEST_OUTPUT: TestOutput = TestOutput;

struct TestContextProvider;

impl LogContextProvider for TestContextProvider {
    fn hart_id(&self) -> usize {
        0
    }

    fn pid(&self) -> u32 {
        3
    }

    fn timestamp(&self) -> usize {
        123456
    }
}

static TEST_PROVIDER: TestContextProvider = TestContextProvider;

fn setup() -> MutexGuard<'static, ()> {
    let guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
    INIT.call_once(|| {
        unsafe {
            klog::register_log_output(&TEST_OUTPUT);
            klog::register_context_provider(&TEST_PROVIDER);
        }
        klog::init_log_bridge().unwrap();
    });
    while klog::read_log().is_some() {}
    take_output();
    guard
}

fn take_output() -> String {
    let buf = OUTPUT_BUF.get_or_init(|| Mutex::new(String::new()));
    let mut g = buf.lock().unwrap();
    std::mem::take(&mut *g)
}

#[test]
fn test_pr_info_buffered_only() {
    let _g = setup();

    pr_info!("hello {}", 1);

    assert_eq!(klog::log_len(), 1);
    let entry = klog::read_log().unwrap();
    assert_eq!(entry.level(), LogLevel::Info);
    assert_eq!(entry.message(), "hello 1");
    // 默认控制台阈值是 Warning
    assert_eq!(take_output(), "");
}

#[test]
fn test_pr_err_prints_to_console() {
    let _g = setup();

    pr_err!("boom: {}", "EIO");

    let out = take_output();
    assert!(out.contains("boom: EIO"));
    assert!(out.ends_with('\n'));
    let entry = klog::read_log().unwrap();
    assert_eq!(entry.level(), LogLevel::Error);
}

#[test]
fn test_drain_log_prints_buffered_entries() {
    let _g = setup();

    pr_info!("first");
    pr_info!("second");
    assert_eq!(take_output(), "");

    assert_eq!(klog::drain_log(&TEST_OUTPUT), 2);
    let out = take_output();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("first"));
    assert!(lines[1].contains("second"));
    assert_eq!(klog::log_len(), 0);
    assert_eq!(klog::drain_log(&TEST_OUTPUT), 0);
}

#[test]
fn test_context_provider_applied_to_entries() {
    let _g = setup();

    pr_warn!("ctx");

    let entry = klog::read_log().unwrap();
    assert_eq!(entry.hart_id(), 0);
    assert_eq!(entry.pid(), 3);
    assert_eq!(entry.timestamp(), 123456);
}

#[test]
fn test_pr_debug_filtered_by_default_level() {
    let _g = setup();

    pr_debug!("should not be logged");

    assert_eq!(klog::log_len(), 0);
    assert_eq!(take_output(), "");
}

#[test]
fn test_log_facade_reaches_buffer() {
    let _g = setup();

    log::warn!("via facade {}", 7);
    log::debug!("filtered");

    assert_eq!(klog::log_len(), 1);
    let entry = klog::read_log().unwrap();
    assert_eq!(entry.level(), LogLevel::Warning);
    assert_eq!(entry.message(), "via facade 7");
}

#[test]
fn test_write_hex() {
    let _g = setup();

    TEST_OUTPUT.write_hex(0x8000_0000_dead_beef);
    assert_eq!(take_output(), "0x80000000deadbeef");
}
