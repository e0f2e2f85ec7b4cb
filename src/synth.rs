use crate::error::Result;
#[cfg(any(target_os = "windows", target_os = "linux"))]
use crate::error::ClickerError;

/// Something that can press and release the left mouse button.
pub trait ClickSink {
    fn press(&mut self) -> Result<()>;
    fn release(&mut self) -> Result<()>;
}

#[cfg(target_os = "windows")]
mod platform {
    use std::mem::{size_of, zeroed};

    use winapi::um::winuser::{
        SendInput, INPUT, INPUT_MOUSE, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
    };

    use super::*;

    pub struct SystemMouse;

    impl SystemMouse {
        pub fn open() -> Result<Self> {
            Ok(SystemMouse)
        }

        fn send(&self, flags: u32) -> Result<()> {
            unsafe {
                let mut input: INPUT = zeroed();
                input.type_ = INPUT_MOUSE;
                input.u.mi_mut().dwFlags = flags;
                let sent = SendInput(1, &mut input, size_of::<INPUT>() as i32);
                if sent == 1 {
                    Ok(())
                } else {
                    Err(ClickerError::DeviceUnavailable(
                        "SendInput rejected the mouse event".into(),
                    ))
                }
            }
        }
    }

    impl ClickSink for SystemMouse {
        fn press(&mut self) -> Result<()> {
            self.send(MOUSEEVENTF_LEFTDOWN)
        }

        fn release(&mut self) -> Result<()> {
            self.send(MOUSEEVENTF_LEFTUP)
        }
    }
}

#[cfg(target_os = "linux")]
mod platform {
    use x11::xlib;
    use x11::xtest::XTestFakeButtonEvent;

    use super::*;

    const LEFT_BUTTON: u32 = 1;

    pub struct SystemMouse {
        display: *mut xlib::Display,
    }

    // The display connection is opened on the caller's thread and then used
    // only by the engine thread that owns this value.
    unsafe impl Send for SystemMouse {}

    impl SystemMouse {
        pub fn open() -> Result<Self> {
            let display = unsafe { xlib::XOpenDisplay(std::ptr::null()) };
            if display.is_null() {
                return Err(ClickerError::DeviceUnavailable(
                    "failed to open X11 display".into(),
                ));
            }
            Ok(Self { display })
        }

        fn button(&self, is_press: bool) -> Result<()> {
            unsafe {
                let ok = XTestFakeButtonEvent(
                    self.display,
                    LEFT_BUTTON,
                    is_press as xlib::Bool,
                    xlib::CurrentTime,
                );
                xlib::XFlush(self.display);
                if ok == 0 {
                    return Err(ClickerError::DeviceUnavailable(
                        "XTest refused the button event".into(),
                    ));
                }
            }
            Ok(())
        }
    }

    impl Drop for SystemMouse {
        fn drop(&mut self) {
            unsafe {
                xlib::XCloseDisplay(self.display);
            }
        }
    }

    impl ClickSink for SystemMouse {
        fn press(&mut self) -> Result<()> {
            self.button(true)
        }

        fn release(&mut self) -> Result<()> {
            self.button(false)
        }
    }
}

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
mod platform {
    use rdev::{simulate, Button, EventType};

    use super::*;
    use crate::error::ClickerError;

    pub struct SystemMouse;

    impl SystemMouse {
        pub fn open() -> Result<Self> {
            Ok(SystemMouse)
        }

        fn send(&self, event: EventType) -> Result<()> {
            simulate(&event).map_err(|e| {
                ClickerError::DeviceUnavailable(format!("could not simulate {event:?}: {e:?}"))
            })
        }
    }

    impl ClickSink for SystemMouse {
        fn press(&mut self) -> Result<()> {
            self.send(EventType::ButtonPress(Button::Left))
        }

        fn release(&mut self) -> Result<()> {
            self.send(EventType::ButtonRelease(Button::Left))
        }
    }
}

pub use platform::SystemMouse;
