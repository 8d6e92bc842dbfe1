use std::any::TypeId;

use wren_api::Message;

// Test basic message without any attributes
#[derive(Message, Debug, PartialEq)]
struct BasicMessage {
    content: String,
}

// Test message with custom result type
#[derive(Message, Debug, PartialEq)]
#[message(result = "String")]
struct CustomResultMessage {
    query: String,
}

// Test message with a custom name
#[derive(Message, Debug)]
#[message(result = "u32", name = "get_edges")]
struct GetEdges;

// Test enum message with a generic result type
#[derive(Message, Debug)]
#[message(result = "Result<Vec<String>, String>")]
enum Command {
    List,
    Remove(String),
}

// Test generic message
#[derive(Message, Debug)]
#[message(result = "usize")]
struct Batch<T: Send + 'static> {
    items: Vec<T>,
}

fn result_type_of<M: Message>() -> TypeId {
    TypeId::of::<M::Result>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_message() {
        let msg = BasicMessage {
            content: "hello".to_string(),
        };
        assert_eq!(msg.content, "hello");
        assert_eq!(result_type_of::<BasicMessage>(), TypeId::of::<()>());
        assert_eq!(<BasicMessage as Message>::name(), "BasicMessage");
    }

    #[test]
    fn test_custom_result_message() {
        let msg = CustomResultMessage {
            query: "select".to_string(),
        };
        assert_eq!(msg.query, "select");
        assert_eq!(result_type_of::<CustomResultMessage>(), TypeId::of::<String>());
    }

    #[test]
    fn test_custom_name() {
        assert_eq!(<GetEdges as Message>::name(), "get_edges");
        assert_eq!(result_type_of::<GetEdges>(), TypeId::of::<u32>());
    }

    #[test]
    fn test_enum_message() {
        let commands = [Command::List, Command::Remove("a".into())];
        assert_eq!(commands.len(), 2);
        assert_eq!(
            result_type_of::<Command>(),
            TypeId::of::<Result<Vec<String>, String>>()
        );
        assert_eq!(<Command as Message>::name(), "Command");
    }

    #[test]
    fn test_generic_message() {
        let batch = Batch { items: vec![1u8, 2, 3] };
        assert_eq!(batch.items.len(), 3);
        assert_eq!(result_type_of::<Batch<u8>>(), TypeId::of::<usize>());
        assert_eq!(<Batch<u8> as Message>::name(), "Batch");
    }
}
