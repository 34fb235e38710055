//! TCP host module: listen, get_clients, get_client_id, write_to_client
//!
//! `listen` serves forever. Host threads only accept connections and read
//! raw lines; every user-callback invocation is funneled through a channel
//! back onto the interpreter thread, which keeps the value graph
//! single-threaded. `on_connect` runs as `(server, client)` and an error
//! from it stops the server; `on_message` runs as `(server, client, reader)`
//! per received line and its errors are reported without stopping.

use crate::builtins::bytes::reader_from_string;
use crate::builtins::{apply_function, builtin, Registry};
use crate::env::Environment;
use crate::error::{EvalError, ARITY_ONE, ARITY_THREE, ARITY_TWO};
use crate::value::{EvalCallback, ModuleValue, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::io::{BufRead, BufReader, Write as IoWrite};
use std::net::{TcpListener, TcpStream};
use std::rc::Rc;
use std::sync::mpsc;
use std::thread;
use uuid::Uuid;

pub struct Server {
    port: i64,
    clients: RefCell<HashMap<String, Value>>,
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tcp::{}", self.port)
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server").field("port", &self.port).finish()
    }
}

pub struct Client {
    id: String,
    stream: RefCell<TcpStream>,
}

impl Client {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").field("id", &self.id).finish()
    }
}

enum NetEvent {
    Connected(TcpStream),
    Message { client_id: String, line: String },
    Disconnected { client_id: String },
}

const LISTEN_SIGNATURE: &str =
    "expected signature net::listen(port, (server, client) => {}, (server, client, data) => {})";

pub fn builtin_listen(
    _env: Rc<Environment>,
    registry: &Registry,
    eval: EvalCallback,
    args: &[Value],
) -> Result<Value, EvalError> {
    if args.len() != 3 {
        return Err(EvalError::arity_error("net::listen", ARITY_THREE, args.len()));
    }
    let (Value::Integer(port), Value::Function(on_connect), Value::Function(on_message)) =
        (&args[0], &args[1], &args[2])
    else {
        return Err(EvalError::runtime_error("net::listen", LISTEN_SIGNATURE));
    };
    let port = *port;
    if !(0..=i64::from(u16::MAX)).contains(&port) {
        return Err(EvalError::runtime_error(
            "net::listen",
            format!("invalid port {}", port),
        ));
    }
    let listener = TcpListener::bind(("0.0.0.0", port as u16))
        .map_err(|error| EvalError::runtime_error("net::listen", error.to_string()))?;

    let (events, inbox) = mpsc::channel();
    let acceptor = events.clone();
    thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if acceptor.send(NetEvent::Connected(stream)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    let server = Rc::new(Server {
        port,
        clients: RefCell::new(HashMap::new()),
    });
    let server_value = Value::Server(Rc::clone(&server));

    // All callbacks run here, one at a time, on the interpreter thread.
    for event in inbox {
        match event {
            NetEvent::Connected(stream) => {
                let id = Uuid::new_v4().to_string();
                let reader_stream = match stream.try_clone() {
                    Ok(clone) => clone,
                    Err(_) => continue,
                };
                let client_value = Value::Client(Rc::new(Client {
                    id: id.clone(),
                    stream: RefCell::new(stream),
                }));
                server
                    .clients
                    .borrow_mut()
                    .insert(id.clone(), client_value.clone());
                spawn_reader(reader_stream, id, events.clone());
                apply_function(
                    on_connect,
                    vec![server_value.clone(), client_value],
                    registry,
                    eval,
                )?;
            }
            NetEvent::Message { client_id, line } => {
                let client_value = server.clients.borrow().get(&client_id).cloned();
                if let Some(client_value) = client_value {
                    let reader = reader_from_string(line);
                    if let Err(error) = apply_function(
                        on_message,
                        vec![server_value.clone(), client_value, reader],
                        registry,
                        eval,
                    ) {
                        eprintln!("net::listen: message handler failed: {}", error);
                    }
                }
            }
            NetEvent::Disconnected { client_id } => {
                server.clients.borrow_mut().remove(&client_id);
            }
        }
    }
    Ok(Value::Null)
}

fn spawn_reader(stream: TcpStream, client_id: String, events: mpsc::Sender<NetEvent>) {
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) | Err(_) => {
                    let _ = events.send(NetEvent::Disconnected {
                        client_id: client_id.clone(),
                    });
                    break;
                }
                Ok(_) => {
                    if events
                        .send(NetEvent::Message {
                            client_id: client_id.clone(),
                            line,
                        })
                        .is_err()
                    {
                        break;
                    }
                }
            }
        }
    });
}

pub fn builtin_get_clients(
    _env: Rc<Environment>,
    _registry: &Registry,
    _eval: EvalCallback,
    args: &[Value],
) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error(
            "net::get_clients",
            ARITY_ONE,
            args.len(),
        ));
    }
    let Value::Server(server) = &args[0] else {
        return Err(EvalError::type_error(
            "net::get_clients",
            "server",
            &args[0],
            1,
        ));
    };
    let clients: Vec<Value> = server.clients.borrow().values().cloned().collect();
    Ok(Value::list(clients))
}

pub fn builtin_get_client_id(
    _env: Rc<Environment>,
    _registry: &Registry,
    _eval: EvalCallback,
    args: &[Value],
) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity_error(
            "net::get_client_id",
            ARITY_ONE,
            args.len(),
        ));
    }
    let Value::Client(client) = &args[0] else {
        return Err(EvalError::type_error(
            "net::get_client_id",
            "client",
            &args[0],
            1,
        ));
    };
    Ok(Value::string(client.id.clone()))
}

pub fn builtin_write_to_client(
    _env: Rc<Environment>,
    _registry: &Registry,
    _eval: EvalCallback,
    args: &[Value],
) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity_error(
            "net::write_to_client",
            ARITY_TWO,
            args.len(),
        ));
    }
    let Value::Client(client) = &args[0] else {
        return Err(EvalError::type_error(
            "net::write_to_client",
            "client",
            &args[0],
            1,
        ));
    };
    let Value::Writer(writer) = &args[1] else {
        return Err(EvalError::type_error(
            "net::write_to_client",
            "writer buffer",
            &args[1],
            2,
        ));
    };
    let payload = writer.contents();
    client
        .stream
        .borrow_mut()
        .write_all(payload.as_bytes())
        .map_err(|error| EvalError::runtime_error("net::write_to_client", error.to_string()))?;
    Ok(Value::Integer(payload.len() as i64))
}

pub fn module() -> Value {
    let env = Environment::new();
    env.set("listen", builtin("listen", builtin_listen));
    env.set("get_clients", builtin("get_clients", builtin_get_clients));
    env.set(
        "get_client_id",
        builtin("get_client_id", builtin_get_client_id),
    );
    env.set(
        "write_to_client",
        builtin("write_to_client", builtin_write_to_client),
    );
    Value::Module(Rc::new(ModuleValue {
        name: "net".to_string(),
        path: "/net".to_string(),
        env,
    }))
}
