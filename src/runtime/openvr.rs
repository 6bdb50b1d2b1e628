//! # OpenVR-backed [`RuntimeClient`].
//!
//! Production implementation over the raw `openvr-sys` bindings, using the
//! FnTable interface convention (`"FnTable:" + <interface version>`). The
//! session connects as an overlay application so the runtime treats the
//! agent as a background component rather than a scene app.
//!
//! Compiled only with the `openvr` feature; everything above this boundary
//! is exercised against test doubles instead.

use std::ffi::{CStr, CString};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use openvr_sys as sys;

use crate::error::RuntimeError;
use crate::runtime::client::{RuntimeClient, RuntimeEvent, RuntimeEventKind};

/// Interface revisions shipped with the bundled OpenVR headers.
const SYSTEM_VERSION: &str = "IVRSystem_019";
const APPLICATIONS_VERSION: &str = "IVRApplications_006";

/// Interface tables resolved from a live session.
///
/// OpenVR interface tables are owned by the runtime and documented as
/// callable from any thread, so the raw pointers may cross threads.
struct Session {
    system: *const sys::VR_IVRSystem_FnTable,
    applications: *const sys::VR_IVRApplications_FnTable,
}

unsafe impl Send for Session {}
unsafe impl Sync for Session {}

/// [`RuntimeClient`] over a SteamVR/OpenVR runtime.
pub struct OpenVrClient {
    session: Mutex<Option<Session>>,
}

impl OpenVrClient {
    /// Creates a disconnected client.
    pub fn new() -> Self {
        Self {
            session: Mutex::new(None),
        }
    }

    fn with_session<T>(
        &self,
        f: impl FnOnce(&Session) -> Result<T, RuntimeError>,
    ) -> Result<T, RuntimeError> {
        let guard = self.session.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some(session) => f(session),
            None => Err(RuntimeError::Application {
                code: "NotConnected".to_owned(),
            }),
        }
    }
}

impl Default for OpenVrClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuntimeClient for OpenVrClient {
    async fn connect(&self) -> Result<(), RuntimeError> {
        let mut guard = self.session.lock().unwrap_or_else(|e| e.into_inner());
        if guard.is_some() {
            return Ok(());
        }

        let mut err = sys::EVRInitError_VRInitError_None;
        unsafe {
            sys::VR_InitInternal(&mut err, sys::EVRApplicationType_VRApplication_Overlay);
        }
        if err != sys::EVRInitError_VRInitError_None {
            return Err(RuntimeError::Init {
                code: init_error_symbol(err),
            });
        }

        let system = interface::<sys::VR_IVRSystem_FnTable>(SYSTEM_VERSION)?;
        let applications = interface::<sys::VR_IVRApplications_FnTable>(APPLICATIONS_VERSION)?;
        *guard = Some(Session {
            system,
            applications,
        });
        Ok(())
    }

    async fn is_application_installed(&self, app_key: &str) -> Result<bool, RuntimeError> {
        let key = c_string(app_key)?;
        self.with_session(|session| {
            let f = entry(unsafe { (*session.applications).IsApplicationInstalled })?;
            Ok(unsafe { f(key.as_ptr() as *mut _) })
        })
    }

    async fn install_manifest(&self, path: &Path) -> Result<(), RuntimeError> {
        let absolute = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());
        let manifest = c_string(&absolute.to_string_lossy())?;
        self.with_session(|session| {
            let f = entry(unsafe { (*session.applications).AddApplicationManifest })?;
            let err = unsafe { f(manifest.as_ptr() as *mut _, false) };
            application_result(session, err)
        })
    }

    async fn set_auto_launch(&self, app_key: &str, enabled: bool) -> Result<(), RuntimeError> {
        let key = c_string(app_key)?;
        self.with_session(|session| {
            let f = entry(unsafe { (*session.applications).SetApplicationAutoLaunch })?;
            let err = unsafe { f(key.as_ptr() as *mut _, enabled) };
            application_result(session, err)
        })
    }

    async fn disconnect(&self) {
        let mut guard = self.session.lock().unwrap_or_else(|e| e.into_inner());
        if guard.take().is_some() {
            unsafe {
                sys::VR_ShutdownInternal();
            }
        }
    }

    async fn poll_next_event(&self) -> Result<Option<RuntimeEvent>, RuntimeError> {
        self.with_session(|session| {
            let f = entry(unsafe { (*session.system).PollNextEvent })?;
            let mut event = std::mem::MaybeUninit::<sys::VREvent_t>::zeroed();
            let pending = unsafe {
                f(
                    event.as_mut_ptr(),
                    std::mem::size_of::<sys::VREvent_t>() as u32,
                )
            };
            if !pending {
                return Ok(None);
            }
            let event = unsafe { event.assume_init() };
            let kind = if event.eventType == sys::EVREventType_VREvent_Quit as u32 {
                RuntimeEventKind::Quit
            } else {
                RuntimeEventKind::Other(event.eventType)
            };
            Ok(Some(RuntimeEvent { kind }))
        })
    }

    async fn acknowledge_quit(&self) {
        let _ = self.with_session(|session| {
            let f = entry(unsafe { (*session.system).AcknowledgeQuit_Exiting })?;
            unsafe { f() };
            Ok(())
        });
    }
}

/// Resolves a FnTable interface pointer for an already-initialized session.
fn interface<T>(version: &str) -> Result<*const T, RuntimeError> {
    let name = c_string(&format!("FnTable:{version}"))?;
    let mut err = sys::EVRInitError_VRInitError_None;
    let ptr = unsafe { sys::VR_GetGenericInterface(name.as_ptr(), &mut err) };
    if err != sys::EVRInitError_VRInitError_None || ptr == 0 {
        return Err(RuntimeError::Init {
            code: init_error_symbol(err),
        });
    }
    Ok(ptr as *const T)
}

/// Unwraps an optional FnTable entry point.
fn entry<T>(f: Option<T>) -> Result<T, RuntimeError> {
    f.ok_or_else(|| RuntimeError::Application {
        code: "MissingEntryPoint".to_owned(),
    })
}

fn application_result(session: &Session, err: sys::EVRApplicationError) -> Result<(), RuntimeError> {
    if err == sys::EVRApplicationError_VRApplicationError_None {
        return Ok(());
    }
    Err(RuntimeError::Application {
        code: application_error_symbol(session, err),
    })
}

/// Symbolic name of an application error, numeric fallback.
fn application_error_symbol(session: &Session, err: sys::EVRApplicationError) -> String {
    unsafe {
        if let Some(f) = (*session.applications).GetApplicationsErrorNameFromEnum {
            let name = f(err);
            if !name.is_null() {
                return CStr::from_ptr(name).to_string_lossy().into_owned();
            }
        }
    }
    format!("VRApplicationError({err})")
}

/// Symbolic name of an init error, numeric fallback.
fn init_error_symbol(err: sys::EVRInitError) -> String {
    unsafe {
        let name = sys::VR_GetVRInitErrorAsSymbol(err);
        if name.is_null() {
            format!("VRInitError({err})")
        } else {
            CStr::from_ptr(name).to_string_lossy().into_owned()
        }
    }
}

/// Interior NULs cannot occur in the fixed identifiers this agent passes,
/// but the conversion still reports instead of panicking.
fn c_string(value: &str) -> Result<CString, RuntimeError> {
    CString::new(value).map_err(|_| RuntimeError::Application {
        code: "InvalidStringArgument".to_owned(),
    })
}
