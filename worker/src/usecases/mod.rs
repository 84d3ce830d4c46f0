pub mod deliver_outgoing_message;
