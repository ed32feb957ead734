use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use flowkeep::config::Config;
use flowkeep::error::UserError;
use flowkeep::message::Message;
use flowkeep::runtime::input::Feed;
use flowkeep::Scope;

#[test]
fn loop_terminates_once_predicate_is_satisfied() {
    let _ = env_logger::try_init();
    let mut scope = Scope::new();
    let (input, feed) = scope.new_input();

    let body = |msg: Message| -> Result<Message, UserError> {
        let n: u32 = String::from_utf8_lossy(msg.as_bytes())
            .parse()
            .map_err(|_| UserError("not a number".to_string()))?;
        Ok(Message::from_str(&(n + 1).to_string()))
    };
    let should_loop = |msg: &Message| -> bool {
        let n: u32 = String::from_utf8_lossy(msg.as_bytes()).parse().unwrap_or(0);
        n < 5
    };

    let exit = scope.loop_scope(input, body, should_loop);

    let (tx, rx) = mpsc::channel();
    scope.inspect(exit, move |msg, _ts| {
        tx.send(String::from_utf8_lossy(msg.as_bytes()).to_string()).unwrap();
        Ok(())
    });

    let (mut worker, cancel, handles) = scope.build(Config::default());
    let worker_thread = thread::spawn(move || worker.run());

    feed.send(Feed::Advance { epoch: 0, message: Message::from_str("0") }).unwrap();

    let observed = rx.recv_timeout(Duration::from_secs(2)).expect("loop exit observed");
    assert_eq!(observed, "5");

    cancel.cancel();
    worker_thread.join().unwrap().unwrap();
    drop(handles);
}
