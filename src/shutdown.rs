use std::thread;

/// Invokes `handler` once when SIGINT or SIGTERM arrives.
///
/// The mask is blocked on the calling thread before the waiter thread is
/// spawned, so every thread created afterwards inherits it and delivery
/// funnels into the `sigwait` below instead of the default action.
pub fn on_interrupt<F>(handler: F)
where
    F: Fn() + Send + 'static,
{
    let mask = unsafe {
        let mut mask: libc::sigset_t = std::mem::zeroed();
        libc::sigemptyset(&mut mask);
        libc::sigaddset(&mut mask, libc::SIGINT);
        libc::sigaddset(&mut mask, libc::SIGTERM);
        libc::pthread_sigmask(libc::SIG_BLOCK, &mask, std::ptr::null_mut());
        mask
    };

    thread::spawn(move || {
        let mut sig: libc::c_int = 0;
        loop {
            if unsafe { libc::sigwait(&mask, &mut sig) } == 0 {
                handler();
                break;
            }
        }
    });
}
