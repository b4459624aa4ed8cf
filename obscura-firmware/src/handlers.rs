//! Registered dispatch targets
//!
//! The camera and SDRAM collaborators are reached only at their
//! interface: these handlers acknowledge the request on the log link and
//! leave the actual sensor/DMA work to their drivers.

use defmt::*;

use obscura_core::status::{Module, RegistryError, STATUS_OK};
use obscura_core::{Command, HandlerError, HandlerTable};
use obscura_protocol::modules::{
    FN_CAMERA_CAPTURE, FN_CAMERA_CONFIGURE, FN_CAMERA_TRANSFER, FN_SYS_ECHO, FN_SYS_PING,
    MODULE_CAMERA, MODULE_SYS,
};

use crate::channels::{log_report, LogRecord, HANDLER_TABLE_CAP};

/// Populate the dispatch table
///
/// Runs once during bring-up, before the dispatcher task starts.
pub fn register_all(table: &mut HandlerTable<HANDLER_TABLE_CAP>) -> Result<(), RegistryError> {
    table.register(MODULE_SYS, FN_SYS_PING, sys_ping)?;
    table.register(MODULE_SYS, FN_SYS_ECHO, sys_echo)?;
    table.register(MODULE_CAMERA, FN_CAMERA_CONFIGURE, camera_configure)?;
    table.register(MODULE_CAMERA, FN_CAMERA_CAPTURE, camera_capture)?;
    table.register(MODULE_CAMERA, FN_CAMERA_TRANSFER, camera_transfer)?;
    Ok(())
}

fn sys_ping(_cmd: &Command) -> Result<(), HandlerError> {
    trace!("PING received");
    log_report(LogRecord::message(Module::Sys, STATUS_OK, "pong"));
    Ok(())
}

/// Echo the payload back on the log link
fn sys_echo(cmd: &Command) -> Result<(), HandlerError> {
    log_report(LogRecord::with_data(
        Module::Sys,
        STATUS_OK,
        "echo",
        cmd.data(),
    ));
    Ok(())
}

fn camera_configure(cmd: &Command) -> Result<(), HandlerError> {
    debug!("Camera configure requested, {} config bytes", cmd.data().len());
    log_report(LogRecord::message(
        Module::Camera,
        STATUS_OK,
        "configure accepted",
    ));
    Ok(())
}

fn camera_capture(_cmd: &Command) -> Result<(), HandlerError> {
    debug!("Camera capture requested");
    log_report(LogRecord::message(
        Module::Camera,
        STATUS_OK,
        "capture accepted",
    ));
    Ok(())
}

fn camera_transfer(_cmd: &Command) -> Result<(), HandlerError> {
    debug!("Camera transfer requested");
    log_report(LogRecord::message(
        Module::Camera,
        STATUS_OK,
        "transfer accepted",
    ));
    Ok(())
}
