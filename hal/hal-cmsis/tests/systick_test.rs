//! SysTick tests for hal-cmsis

use std::sync::atomic::{AtomicUsize, Ordering};

use hal::timer::Timer;
use hal::HalError;
use hal_cmsis::registers::stctrl;
use hal_cmsis::sim::SimBank;
use hal_cmsis::{ChipConfig, ClockSource, Register, SysTick, SysTickConfig};

fn systick(bank: &SimBank) -> SysTick<&SimBank> {
    SysTick::new(bank, ChipConfig::TM4C123GH6PM.systick)
}

#[test]
fn test_init_programs_period_and_clears_counter() {
    let bank = SimBank::new();
    let systick = systick(&bank);
    bank.poke(Register::SysTickCurrent, 0x1234);

    for ms in [1u32, 10, 250, 1048] {
        systick.init(ms).unwrap();
        assert_eq!(bank.peek(Register::SysTickReload), ms * 16_000 - 1);
        assert_eq!(bank.peek(Register::SysTickCurrent), 0);
        assert!(systick.is_running());
    }
}

#[test]
fn test_busy_wait_returns_after_expiry_and_leaves_timer_off() {
    let bank = SimBank::new();
    let systick = systick(&bank);

    systick.start_busy_wait(10).unwrap();

    assert!(bank.count_reads() >= 1);
    assert_eq!(bank.expirations(), 1);
    assert_eq!(bank.peek(Register::SysTickCtrl), 0);
    assert_eq!(bank.peek(Register::SysTickReload), 0);
    assert_eq!(bank.peek(Register::SysTickCurrent), 0);
}

#[test]
fn test_busy_wait_replaces_periodic_configuration() {
    let bank = SimBank::new();
    let systick = systick(&bank);

    systick.init(100).unwrap();
    systick.start_busy_wait(1).unwrap();
    assert!(!systick.is_running());
    assert_eq!(systick.reload(), 0);
}

#[test]
fn test_busy_wait_rejects_bad_period_without_touching_registers() {
    let bank = SimBank::new();
    let systick = systick(&bank);

    assert_eq!(systick.start_busy_wait(0), Err(HalError::InvalidPeriod(0)));
    assert_eq!(systick.start_busy_wait(2000), Err(HalError::InvalidPeriod(2000)));
    assert_eq!(bank.writes(), 0);
}

static TICKS: AtomicUsize = AtomicUsize::new(0);

fn count_tick() {
    TICKS.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn test_handler_runs_callback_once_per_call() {
    let bank = SimBank::new();
    let systick = systick(&bank);
    assert!(!systick.handler());

    systick.set_callback(count_tick);
    systick.init(1).unwrap();
    assert!(systick.handler());
    assert_eq!(TICKS.load(Ordering::SeqCst), 1);
    assert!(systick.handler());
    assert_eq!(TICKS.load(Ordering::SeqCst), 2);
}

static FIRST: AtomicUsize = AtomicUsize::new(0);
static SECOND: AtomicUsize = AtomicUsize::new(0);

fn first() {
    FIRST.fetch_add(1, Ordering::SeqCst);
}

fn second() {
    SECOND.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn test_later_callback_replaces_earlier() {
    let bank = SimBank::new();
    let systick = systick(&bank);

    systick.set_callback(first);
    systick.set_callback(second);
    systick.handler();

    assert_eq!(FIRST.load(Ordering::SeqCst), 0);
    assert_eq!(SECOND.load(Ordering::SeqCst), 1);
}

static AFTER_DEINIT: AtomicUsize = AtomicUsize::new(0);

fn after_deinit() {
    AFTER_DEINIT.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn test_deinit_drops_callback_and_zeroes_registers() {
    let bank = SimBank::new();
    let systick = systick(&bank);

    systick.set_callback(after_deinit);
    systick.init(5).unwrap();
    systick.deinit();

    assert!(!systick.has_callback());
    assert!(!systick.handler());
    assert_eq!(AFTER_DEINIT.load(Ordering::SeqCst), 0);
    assert_eq!(bank.peek(Register::SysTickCtrl), 0);
    assert_eq!(bank.peek(Register::SysTickReload), 0);
    assert_eq!(bank.peek(Register::SysTickCurrent), 0);
}

#[test]
fn test_stop_and_start_keep_configuration() {
    let bank = SimBank::new();
    let systick = systick(&bank);

    systick.init(20).unwrap();
    systick.stop();
    assert!(!systick.is_running());
    assert_eq!(systick.reload(), 319_999);
    assert_eq!(
        bank.peek(Register::SysTickCtrl) & (stctrl::INTEN | stctrl::CLK_SRC),
        stctrl::INTEN | stctrl::CLK_SRC
    );

    systick.start();
    assert!(systick.is_running());
    assert_eq!(systick.reload(), 319_999);
}

#[test]
fn test_stopped_counter_holds_its_value() {
    let bank = SimBank::with_step(0);
    let systick = SysTick::new(&bank, SysTickConfig::new(100, ClockSource::System));

    systick.init(1).unwrap();
    bank.advance(11);
    assert_eq!(systick.current(), 89);

    systick.stop();
    bank.advance(50);
    assert_eq!(systick.current(), 89);
}

#[test]
fn test_timer_trait_dispatch() {
    let bank = SimBank::new();
    let systick = systick(&bank);
    let timer: &dyn Timer = &systick;

    timer.init(3).unwrap();
    assert_eq!(bank.peek(Register::SysTickReload), 47_999);
    timer.stop();
    assert!(!systick.is_running());
    timer.start_busy_wait(1).unwrap();
    assert_eq!(bank.peek(Register::SysTickCtrl), 0);
    timer.deinit();
    assert!(!timer.handler());
}
