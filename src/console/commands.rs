//! Command handlers
//!
//! Commands are producers only: they queue macros and change mouse state
//! or configuration, and never send reports themselves.

use core::fmt::Write;

use super::parser::ParsedCommand;
use super::ConsoleError;
use crate::config::{find_param, find_params_matching, ConfigPersistence, PanelConfig, PARAMS};
use crate::hid::MouseButtons;
use crate::macros::MacroStore;
use crate::mouse::MouseState;
use crate::queue::MacroQueue;
use crate::stats::EngineStats;

/// Everything a command may touch
pub struct ConsoleContext<'a> {
    pub store: Option<&'a MacroStore>,
    pub queue: &'a MacroQueue,
    pub mouse: &'a MouseState,
    pub stats: &'a EngineStats,
    pub config: &'a PanelConfig,
    pub persist: &'a mut dyn ConfigPersistence,
}

/// Command handler signature
pub type Handler =
    fn(&ParsedCommand<'_>, &mut ConsoleContext<'_>, &mut dyn Write) -> Result<(), ConsoleError>;

/// Command descriptor
pub struct CommandDescriptor {
    pub name: &'static str,
    pub usage: &'static str,
    pub brief: &'static str,
    pub handler: Handler,
}

/// All available commands
pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor { name: "help", usage: "help [cmd]", brief: "List commands", handler: cmd_help },
    CommandDescriptor { name: "macros", usage: "macros", brief: "List macros", handler: cmd_macros },
    CommandDescriptor { name: "run", usage: "run <n>", brief: "Queue macro n", handler: cmd_run },
    CommandDescriptor { name: "move", usage: "move <dx> <dy>", brief: "Set mouse velocity", handler: cmd_move },
    CommandDescriptor { name: "stop", usage: "stop", brief: "Stop mouse, release buttons", handler: cmd_stop },
    CommandDescriptor { name: "buttons", usage: "buttons <mask>", brief: "Hold mouse buttons", handler: cmd_buttons },
    CommandDescriptor { name: "show", usage: "show [param|prefix*]", brief: "Show parameters", handler: cmd_show },
    CommandDescriptor { name: "set", usage: "set <param> <value>", brief: "Set parameter value", handler: cmd_set },
    CommandDescriptor { name: "save", usage: "save", brief: "Persist to NVS", handler: cmd_save },
    CommandDescriptor { name: "stats", usage: "stats", brief: "Engine statistics", handler: cmd_stats },
    CommandDescriptor { name: "reboot", usage: "reboot confirm", brief: "Restart system", handler: cmd_reboot },
];

/// Execute a parsed command
pub fn execute(
    cmd: &ParsedCommand<'_>,
    ctx: &mut ConsoleContext<'_>,
    out: &mut dyn Write,
) -> Result<(), ConsoleError> {
    if cmd.command.is_empty() {
        return Ok(());
    }

    let descriptor = COMMANDS
        .iter()
        .find(|c| c.name == cmd.command)
        .ok_or(ConsoleError::UnknownCommand)?;

    (descriptor.handler)(cmd, ctx, out)
}

// --- Command Implementations ---

fn cmd_help(cmd: &ParsedCommand<'_>, _ctx: &mut ConsoleContext<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    if let Some(name) = cmd.arg(0) {
        let c = COMMANDS
            .iter()
            .find(|c| c.name == name)
            .ok_or(ConsoleError::UnknownCommand)?;
        let _ = writeln!(out, "{}: {}", c.usage, c.brief);
    } else {
        for c in COMMANDS {
            let _ = writeln!(out, "  {:<22} {}", c.usage, c.brief);
        }
    }
    Ok(())
}

fn cmd_macros(_cmd: &ParsedCommand<'_>, ctx: &mut ConsoleContext<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let store = ctx.store.ok_or(ConsoleError::NoMacros)?;

    for (i, m) in store.iter().enumerate() {
        let _ = write!(out, "  {:>2} {:<10} {:>3} steps", i, m.label(), m.steps().len());
        if let Some(desc) = m.description() {
            let _ = write!(out, "  {}", desc);
        }
        let _ = writeln!(out);
    }
    Ok(())
}

fn cmd_run(cmd: &ParsedCommand<'_>, ctx: &mut ConsoleContext<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let index: usize = cmd.parse_arg(0)?;
    let store = ctx.store.ok_or(ConsoleError::NoMacros)?;

    if !store.enqueue_all(index, ctx.queue) {
        return Err(ConsoleError::OutOfRange);
    }
    ctx.stats.record_macro_started();

    let _ = writeln!(out, "queued {}", store.label(index).unwrap_or(""));
    Ok(())
}

fn cmd_move(cmd: &ParsedCommand<'_>, ctx: &mut ConsoleContext<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let dx: i8 = cmd.parse_arg(0)?;
    let dy: i8 = cmd.parse_arg(1)?;

    ctx.mouse.set_velocity(dx, dy);
    let _ = writeln!(out, "velocity {},{}", dx, dy);
    Ok(())
}

fn cmd_stop(_cmd: &ParsedCommand<'_>, ctx: &mut ConsoleContext<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    ctx.mouse.stop();
    let _ = writeln!(out, "stopped");
    Ok(())
}

fn cmd_buttons(cmd: &ParsedCommand<'_>, ctx: &mut ConsoleContext<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let text = cmd.arg(0).ok_or(ConsoleError::MissingArg)?;
    let mask = match text.strip_prefix("0x") {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => text.parse(),
    }
    .map_err(|_| ConsoleError::InvalidValue)?;

    let buttons = MouseButtons::from_bits(mask).ok_or(ConsoleError::OutOfRange)?;
    ctx.mouse.set_buttons(buttons);
    let _ = writeln!(out, "buttons 0x{:02x}", buttons.bits());
    Ok(())
}

fn cmd_show(cmd: &ParsedCommand<'_>, ctx: &mut ConsoleContext<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    match cmd.arg(0) {
        Some(pattern) => {
            let mut found = false;
            for p in find_params_matching(pattern) {
                let _ = writeln!(out, "{}={}", p.name, (p.get_fn)(ctx.config));
                found = true;
            }
            if !found {
                return Err(ConsoleError::UnknownParam);
            }
        }
        None => {
            for p in PARAMS {
                let _ = writeln!(out, "{}={} {:<8} {}", p.name, (p.get_fn)(ctx.config), p.unit, p.description);
            }
        }
    }
    Ok(())
}

fn cmd_set(cmd: &ParsedCommand<'_>, ctx: &mut ConsoleContext<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let name = cmd.arg(0).ok_or(ConsoleError::MissingArg)?;
    let text = cmd.arg(1).ok_or(ConsoleError::MissingArg)?;

    let param = find_param(name).ok_or(ConsoleError::UnknownParam)?;
    let value = param.parse(text)?;
    (param.set_fn)(ctx.config, value).map_err(|_| ConsoleError::OutOfRange)?;

    let _ = writeln!(out, "{}={}", param.name, value);
    Ok(())
}

fn cmd_save(_cmd: &ParsedCommand<'_>, ctx: &mut ConsoleContext<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    if let Err(e) = ctx.persist.save(ctx.config) {
        log::warn!("config save failed: {}", e);
        return Err(ConsoleError::NvsError);
    }
    let _ = writeln!(out, "saved");
    Ok(())
}

fn cmd_stats(_cmd: &ParsedCommand<'_>, ctx: &mut ConsoleContext<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    let s = ctx.stats.snapshot();
    let mouse = ctx.mouse.snapshot();

    let _ = writeln!(out, "keyboard reports: {}", s.keyboard_reports);
    let _ = writeln!(out, "mouse reports:    {}", s.mouse_reports);
    let _ = writeln!(out, "send failures:    {} (last: {:?})", s.send_failures, s.last_failure);
    let _ = writeln!(out, "mouse deferrals:  {}", s.mouse_deferrals);
    let _ = writeln!(out, "macros started:   {}", s.macros_started);
    let _ = writeln!(
        out,
        "queue:            {}/{} (dropped {})",
        ctx.queue.len(),
        ctx.queue.capacity(),
        ctx.queue.dropped()
    );
    let _ = writeln!(
        out,
        "mouse:            v={},{} buttons=0x{:02x}",
        mouse.dx,
        mouse.dy,
        mouse.buttons.bits()
    );

    #[cfg(target_os = "espidf")]
    {
        // SAFETY: read-only system queries
        let (heap, uptime_us) = unsafe {
            (
                esp_idf_svc::sys::esp_get_free_heap_size(),
                esp_idf_svc::sys::esp_timer_get_time(),
            )
        };
        let _ = writeln!(out, "heap free:        {} bytes", heap);
        let _ = writeln!(out, "uptime:           {}s", uptime_us / 1_000_000);
    }

    Ok(())
}

fn cmd_reboot(cmd: &ParsedCommand<'_>, _ctx: &mut ConsoleContext<'_>, out: &mut dyn Write) -> Result<(), ConsoleError> {
    if cmd.arg(0) != Some("confirm") {
        return Err(ConsoleError::RequiresConfirm);
    }

    let _ = writeln!(out, "rebooting...");

    #[cfg(target_os = "espidf")]
    // SAFETY: does not return
    unsafe {
        esp_idf_svc::sys::esp_restart();
    }

    Ok(())
}
