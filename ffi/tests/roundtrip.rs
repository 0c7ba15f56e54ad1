//! Drives the C ABI against the live mock server.

use std::ffi::{CStr, CString};
use std::net::{SocketAddr, TcpListener};

use pollab_ffi::types::{FfiDataTag, FfiErrorCode, FfiPoll, FfiPollList, FfiPollResult};
use pollab_ffi::*;

fn start_server() -> SocketAddr {
    let std_listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn text(ptr: *const std::os::raw::c_char) -> String {
    unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string()
}

fn poll_of(result: &FfiPollResult) -> &FfiPoll {
    assert_eq!(result.error_code, FfiErrorCode::Ok);
    assert_eq!(result.data_tag, FfiDataTag::Poll);
    unsafe { &*(result.data as *const FfiPoll) }
}

#[test]
fn poll_lifecycle_over_ffi() {
    let addr = start_server();
    let url = CString::new(format!("http://{addr}")).unwrap();
    let client = pollab_client_new_with_retry(url.as_ptr(), 2, 20, 5_000);
    assert!(!client.is_null());

    // create
    let title = CString::new("Lunch?").unwrap();
    let pizza = CString::new("Pizza").unwrap();
    let sushi = CString::new("Sushi").unwrap();
    let options = [pizza.as_ptr(), sushi.as_ptr()];
    let created = pollab_create_poll(client, title.as_ptr(), options.as_ptr(), 2, 2);
    let poll = poll_of(unsafe { &*created });
    assert_eq!(text(poll.title), "Lunch?");
    assert_eq!(poll.options_len, 2);
    assert!(!poll.expires_at.is_null());
    assert!(!pollab_is_expired(poll.expires_at));
    let poll_id = CString::new(poll.id.to_string()).unwrap();
    let pizza_id = unsafe { (*poll.options).id };
    pollab_free_result(created);

    // list
    let listed = pollab_list_polls(client);
    let r = unsafe { &*listed };
    assert_eq!(r.data_tag, FfiDataTag::PollList);
    let list = unsafe { &*(r.data as *const FfiPollList) };
    assert_eq!(list.len, 1);
    pollab_free_result(listed);

    // vote
    let ana = CString::new("ana").unwrap();
    let voted = pollab_vote(client, poll_id.as_ptr(), pizza_id, ana.as_ptr());
    let poll = poll_of(unsafe { &*voted });
    let options = unsafe { std::slice::from_raw_parts(poll.options, poll.options_len as usize) };
    assert_eq!(options[0].vote_count, 1);
    assert_eq!(options[1].vote_count, 0);
    pollab_free_result(voted);

    // same participant again
    let again = pollab_vote(client, poll_id.as_ptr(), pizza_id, ana.as_ptr());
    let r = unsafe { &*again };
    assert_eq!(r.error_code, FfiErrorCode::Conflict);
    assert_eq!(r.http_status, 409);
    pollab_free_result(again);

    // unknown poll
    let missing_id = CString::new("999").unwrap();
    let missing = pollab_get_poll(client, missing_id.as_ptr());
    let r = unsafe { &*missing };
    assert_eq!(r.error_code, FfiErrorCode::NotFound);
    assert_eq!(r.http_status, 404);
    pollab_free_result(missing);

    pollab_client_free(client);
}
