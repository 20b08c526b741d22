use crate::instructions::CallSite;

/// Platform policy deciding which calls originate untrusted data, which
/// ones let data leave the procedure, and which argument slots count as the
/// data being sunk. Injected into drivers as a strategy object; the flow
/// algorithms never consult it directly.
pub trait CallSemantics {
    /// Does this call read data from outside the program (a source)?
    fn is_source(&self, call: &CallSite) -> bool;

    /// Can data flowing into this call legitimately terminate here (a sink)?
    fn can_sink(&self, call: &CallSite) -> bool;

    /// Is the argument at `index` the data a sink call writes out? Defaults
    /// to every argument of a sink call.
    fn sink_argument(&self, call: &CallSite, index: usize) -> bool {
        self.can_sink(call) && index < call.args.len()
    }
}

/// POSIX classification: the read family produces untrusted input, the
/// write family sends data out, and the buffer argument is the sunk datum.
pub struct PosixCallSemantics;

const SOURCES: &[&str] = &[
    "read", "pread", "readv", "recv", "recvfrom", "recvmsg", "fread", "fgets", "getenv",
];

// (callee, index of the outgoing data argument)
const SINKS: &[(&str, usize)] = &[
    ("write", 1),
    ("pwrite", 1),
    ("writev", 1),
    ("send", 1),
    ("sendto", 1),
    ("sendmsg", 1),
    ("fwrite", 0),
    ("fputs", 0),
];

impl PosixCallSemantics {
    fn sink_entry(call: &CallSite) -> Option<usize> {
        let name = call.callee_name()?;
        SINKS
            .iter()
            .find(|(sink, _)| *sink == name)
            .map(|(_, index)| *index)
    }
}

impl CallSemantics for PosixCallSemantics {
    fn is_source(&self, call: &CallSite) -> bool {
        call.callee_name()
            .map(|name| SOURCES.contains(&name))
            .unwrap_or(false)
    }

    fn can_sink(&self, call: &CallSite) -> bool {
        Self::sink_entry(call).is_some()
    }

    fn sink_argument(&self, call: &CallSite, index: usize) -> bool {
        Self::sink_entry(call) == Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::Callee;
    use crate::types::Type;
    use crate::values::{TempId, Value};

    fn call_site(result: &Value, callee: &Callee, args: &[Value]) -> crate::instructions::Instruction {
        crate::instructions::Instruction::Call {
            result: result.clone(),
            callee: callee.clone(),
            args: args.to_vec(),
            ty: Type::Int(64),
        }
    }

    #[test]
    fn read_is_a_source_not_a_sink() {
        let result = Value::Temp(TempId(0));
        let callee = Callee::Direct("read".to_string());
        let args = vec![Value::int(0, 32), Value::Temp(TempId(1)), Value::int(64, 64)];
        let inst = call_site(&result, &callee, &args);
        let call = inst.as_call().unwrap();

        let cs = PosixCallSemantics;
        assert!(cs.is_source(&call));
        assert!(!cs.can_sink(&call));
    }

    #[test]
    fn write_sinks_through_its_buffer_argument() {
        let result = Value::Temp(TempId(0));
        let callee = Callee::Direct("write".to_string());
        let args = vec![Value::int(1, 32), Value::Temp(TempId(1)), Value::int(64, 64)];
        let inst = call_site(&result, &callee, &args);
        let call = inst.as_call().unwrap();

        let cs = PosixCallSemantics;
        assert!(cs.can_sink(&call));
        assert!(!cs.sink_argument(&call, 0));
        assert!(cs.sink_argument(&call, 1));
        assert!(!cs.sink_argument(&call, 2));
    }

    #[test]
    fn indirect_calls_are_unclassified() {
        let result = Value::Temp(TempId(0));
        let callee = Callee::Indirect(Value::Temp(TempId(1)));
        let inst = call_site(&result, &callee, &[]);
        let call = inst.as_call().unwrap();

        let cs = PosixCallSemantics;
        assert!(!cs.is_source(&call));
        assert!(!cs.can_sink(&call));
    }
}
